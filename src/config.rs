use crate::components::format::Locale;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use anyhow::Context;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Expense JSON file; relative paths are resolved against the config directory
    pub data_file: String,
    /// Optional YAML category table
    pub categories_file: String,
    /// CSV file imported once at startup, then renamed to `*.imported`
    pub import_csv: Option<String>,
    /// IANA timezone used for calendar days and display
    pub timezone: String,
    pub locale: Locale,
    pub currency_suffix: String,
    pub header_date_pattern: String,
    pub detail_date_pattern: String,
    pub time_pattern: String,
    pub tick_rate_ms: u64,
    /// Default log filter when `ACCOUNTBOOK_LOG` is not set
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: "expenses.json".to_string(),
            categories_file: "categories.yml".to_string(),
            import_csv: None,
            timezone: "Asia/Seoul".to_string(),
            locale: Locale::Korean,
            currency_suffix: "원".to_string(),
            header_date_pattern: "yyyy년 MM월 dd일 (E)".to_string(),
            detail_date_pattern: "yyyy년 MM월 dd일 HH:mm".to_string(),
            time_pattern: "HH:mm".to_string(),
            tick_rate_ms: 100,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".accountbook"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Saved config, or defaults written out when no file exists yet
    ///
    /// A file that exists but does not parse is reported and left untouched.
    pub fn load_or_init() -> anyhow::Result<Config> {
        match Self::config_path() {
            Some(path) => Self::load_or_init_at(&path),
            None => Ok(Config::default()),
        }
    }

    fn load_or_init_at(path: &Path) -> anyhow::Result<Config> {
        if let Some(config) = Self::load_from(path)? {
            return Ok(config);
        }
        let config = Config::default();
        config
            .save_to(path)
            .with_context(|| format!("writing default config to {}", path.display()))?;
        Ok(config)
    }

    fn load_from(path: &Path) -> anyhow::Result<Option<Config>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Configured timezone, falling back to Asia/Seoul when unknown
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("unknown timezone '{}', using Asia/Seoul", self.timezone);
            chrono_tz::Asia::Seoul
        })
    }

    fn resolve(&self, file: &str) -> Option<PathBuf> {
        if file.is_empty() {
            return None;
        }
        let path = PathBuf::from(file);
        if path.is_absolute() {
            return Some(path);
        }
        Some(Self::config_dir().map(|dir| dir.join(&path)).unwrap_or(path))
    }

    pub fn data_path(&self) -> Option<PathBuf> {
        self.resolve(&self.data_file)
    }

    pub fn categories_path(&self) -> Option<PathBuf> {
        self.resolve(&self.categories_file)
    }

    pub fn import_path(&self) -> Option<PathBuf> {
        self.import_csv.as_deref().and_then(|f| self.resolve(f))
    }
}
