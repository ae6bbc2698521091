//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them by calling controller intents.

use crate::model::expense::NewExpense;
use crate::model::ui::Screen;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick; drains repository deliveries
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Switch to the given screen
    SwitchScreen(Screen),
    /// Switch to the other screen
    NextScreen,
    /// Show the following day
    NextDay,
    /// Show the previous day
    PrevDay,
    /// Jump back to today
    Today,

    // ─────────────────────────────────────────────────────────────────────────
    // Screen intents
    // ─────────────────────────────────────────────────────────────────────────
    /// Open the detail of the item at this index of the current screen
    SelectItem(usize),
    /// Close the detail overlay
    DismissDetail,
    /// Re-issue the current screen's query
    Refresh,
    /// Delete the item at this index of the current screen
    DeleteItem(usize),
    /// Delete the item shown in the detail overlay
    DeleteSelected,
    /// Open the add-expense form for the displayed day
    AddExpense,
    /// Create an expense from the add form
    SubmitExpense(NewExpense),

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Close the current modal
    CloseModal,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::SwitchScreen(screen) => write!(f, "SwitchScreen({})", screen.name()),
            Action::NextScreen => write!(f, "NextScreen"),
            Action::NextDay => write!(f, "NextDay"),
            Action::PrevDay => write!(f, "PrevDay"),
            Action::Today => write!(f, "Today"),
            Action::SelectItem(i) => write!(f, "SelectItem({})", i),
            Action::DismissDetail => write!(f, "DismissDetail"),
            Action::Refresh => write!(f, "Refresh"),
            Action::DeleteItem(i) => write!(f, "DeleteItem({})", i),
            Action::DeleteSelected => write!(f, "DeleteSelected"),
            Action::AddExpense => write!(f, "AddExpense"),
            Action::SubmitExpense(e) => write!(f, "SubmitExpense({})", e.product_name),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
        }
    }
}
