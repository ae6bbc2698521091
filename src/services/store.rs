//! Expense persistence for the local repository
//!
//! Expenses are kept in a JSON file (`{"expenses": [...]}`), written in full
//! after every mutation. A CSV file can be imported once at startup.

use crate::error::{RepositoryError, RepositoryResult};
use crate::model::expense::{CategoryId, Expense, NewExpense};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of the expense file
#[derive(Debug, Default, Serialize, Deserialize)]
struct ExpenseFile {
    #[serde(default)]
    expenses: Vec<Expense>,
}

/// Expense file location; `None` keeps everything in memory
#[derive(Debug, Clone, Default)]
pub struct ExpenseStore {
    path: Option<PathBuf>,
}

impl ExpenseStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn in_memory() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read all expenses; a missing file is an empty store
    pub fn load(&self) -> RepositoryResult<Vec<Expense>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };

        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(path).map_err(|e| RepositoryError::io(path, e))?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let file: ExpenseFile =
            serde_json::from_str(&contents).map_err(|source| RepositoryError::Json {
                path: path.clone(),
                source,
            })?;
        Ok(file.expenses)
    }

    /// Replace the file contents with `expenses`
    pub fn save(&self, expenses: &[Expense]) -> RepositoryResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| RepositoryError::io(dir, e))?;
            }
        }

        let file = ExpenseFile {
            expenses: expenses.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| RepositoryError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(path, json).map_err(|e| RepositoryError::io(path, e))?;
        Ok(())
    }
}

/// One CSV row: `product_name,amount,category_id,timestamp,photo_uri`
#[derive(Debug, Deserialize)]
struct CsvRow {
    product_name: String,
    amount: u64,
    #[serde(default)]
    category_id: Option<u64>,
    timestamp: i64,
    #[serde(default)]
    photo_uri: Option<String>,
}

/// Parse a CSV export into validated expenses with their timestamps
pub fn read_csv(path: &Path) -> RepositoryResult<Vec<(NewExpense, i64)>> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| RepositoryError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record.map_err(|source| RepositoryError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

        let new = NewExpense {
            product_name: row.product_name,
            amount: row.amount,
            category_id: row.category_id.map(CategoryId),
            photo_uri: row.photo_uri,
        }
        .validate()
        .map_err(|e| RepositoryError::Validation(format!("{} row {}: {}", path.display(), line + 1, e)))?;

        rows.push((new, row.timestamp));
    }
    Ok(rows)
}

#[cfg(test)]
pub(crate) fn temp_path(name: &str) -> PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("accountbook-{}-{}-{}", std::process::id(), nanos, name))
}
