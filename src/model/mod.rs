//! Model layer - immutable snapshots and the values they carry
//!
//! - `expense` - records, categories and the joined projection
//! - `gallery` / `daily` - screen snapshots and their reducers
//! - `modal` - overlay stack for dialogs not driven by a snapshot
//! - `ui` - screen selection

pub mod daily;
pub mod expense;
pub mod gallery;
pub mod modal;
pub mod ui;

pub use expense::{Category, CategoryId, Expense, ExpenseId, ExpenseWithCategory, NewExpense};
pub use ui::Screen;
