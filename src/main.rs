//! accountbook - a terminal account book
//!
//! Daily expenses and a receipt photo gallery over a local expense store.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod controller;
mod error;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::{now_millis, App};
use crate::component::Component;
use crate::config::Config;
use crate::services::{load_categories, read_csv, ExpenseRepository, ExpenseStore, LocalRepository};
use crate::tui::Tui;
use anyhow::{Context, Result};
use crossterm::event::Event;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let (config, config_error) = match Config::load_or_init() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let log_path = logging::init(&config)?;
    tracing::info!("starting accountbook, log file {:?}", log_path);
    if let Some(e) = config_error {
        tracing::warn!("using default config: {:#}", e);
    }

    let repository = open_repository(&config)?;

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(config.tick_rate_ms.max(10)));
    tui.enter()?;

    let mut app = App::new(config, repository, now_millis);
    app.init()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    // Handle any errors
    if let Err(err) = result {
        tracing::error!("fatal: {:?}", err);
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    tracing::info!("bye");
    Ok(())
}

/// Build the local repository, importing the configured CSV once
fn open_repository(config: &Config) -> Result<Arc<dyn ExpenseRepository>> {
    let categories = load_categories(config.categories_path().as_deref())
        .context("loading categories")?;
    let store = ExpenseStore::new(config.data_path());
    let repository = LocalRepository::open(store, categories).context("opening expense store")?;

    if let Some(csv_path) = config.import_path().filter(|p| p.exists()) {
        import_csv(&repository, &csv_path)?;
    }

    Ok(Arc::new(repository))
}

fn import_csv(repository: &LocalRepository, path: &Path) -> Result<()> {
    let rows = read_csv(path).with_context(|| format!("reading {}", path.display()))?;
    let count = repository.import(rows)?;

    let mut done: OsString = path.as_os_str().to_owned();
    done.push(".imported");
    let done = PathBuf::from(done);
    std::fs::rename(path, &done)
        .with_context(|| format!("renaming {} to {}", path.display(), done.display()))?;

    tracing::info!("imported {} expenses from {}", count, path.display());
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!("draw error: {}", e);
            }
        })?;

        // Poll for events
        if let Some(event) = tui.next_event()? {
            // Convert event to action
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                tracing::debug!("action {}", a);
                current_action = app.update(a)?;
            }
        } else {
            // No event - send a tick to drain repository deliveries
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}
