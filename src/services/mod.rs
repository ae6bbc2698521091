//! Data services
//!
//! - `repository` - push-style expense queries and mutations
//! - `store` - JSON persistence and CSV import
//! - `categories` - category table loading
//! - `day_filter` - calendar-day arithmetic in the configured timezone

pub mod categories;
pub mod day_filter;
pub mod repository;
pub mod store;

pub use categories::load_categories;
pub use repository::{ExpenseRepository, LocalRepository};
pub use store::{read_csv, ExpenseStore};
