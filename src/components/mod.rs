//! UI Components
//!
//! Screens draw controller snapshots; the components only keep cursor and
//! form state. Components communicate through Actions rather than direct
//! state mutation.

pub mod add_expense_dialog;
pub mod daily;
pub mod detail;
pub mod format;
pub mod gallery;
pub mod help_dialog;
pub mod layout;
pub mod quit_dialog;

pub use add_expense_dialog::AddExpenseDialog;
pub use daily::{draw_daily_screen, DailyComponent};
pub use detail::ExpenseDetailDialog;
pub use format::Formatter;
pub use gallery::{draw_gallery_screen, GalleryComponent};
pub use help_dialog::HelpDialog;
pub use layout::{calculate_main_layout, centered_popup};
pub use quit_dialog::QuitDialog;
