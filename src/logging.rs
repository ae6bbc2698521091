//! File-based tracing setup
//!
//! The terminal belongs to the UI, so log lines go to
//! `~/.accountbook/accountbook.log`. `ACCOUNTBOOK_LOG` overrides the
//! configured filter (e.g. `ACCOUNTBOOK_LOG=accountbook=debug`).

use crate::config::Config;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ACCOUNTBOOK_LOG";

/// Install the global subscriber; returns the log file path
pub fn init(config: &Config) -> Result<Option<PathBuf>> {
    let Some(dir) = Config::config_dir() else {
        return Ok(None);
    };
    fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let path = dir.join("accountbook.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {}", e))?;

    Ok(Some(path))
}
