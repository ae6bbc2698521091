//! Daily screen snapshot and its reducer
//!
//! Mirrors the gallery state machine, with a displayed day on top: the
//! snapshot keeps the last full collection privately so that moving to
//! another day refilters without issuing a new query.

use super::expense::ExpenseWithCategory;
use super::gallery::reselect;
use crate::services::day_filter::filter_by_day;
use chrono_tz::Tz;
use std::sync::Arc;

/// Everything the daily renderer needs at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyUiState {
    is_loading: bool,
    day: i64,
    source: Arc<[ExpenseWithCategory]>,
    items: Vec<ExpenseWithCategory>,
    total: u64,
    selected_item: Option<ExpenseWithCategory>,
    error: Option<String>,
}

impl DailyUiState {
    /// Loading snapshot for the day containing `day`
    pub fn new(day: i64) -> Self {
        Self {
            is_loading: true,
            day,
            source: Arc::from(Vec::new()),
            items: Vec::new(),
            total: 0,
            selected_item: None,
            error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Reference instant of the displayed day
    pub fn day(&self) -> i64 {
        self.day
    }

    /// Expenses of the displayed day, newest first
    pub fn items(&self) -> &[ExpenseWithCategory] {
        &self.items
    }

    /// Sum of the displayed day's amounts
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn selected_item(&self) -> Option<&ExpenseWithCategory> {
        self.selected_item.as_ref()
    }

    pub fn show_detail(&self) -> bool {
        self.selected_item.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Inputs to the daily state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailyEvent {
    DataArrived(Vec<ExpenseWithCategory>),
    LoadFailed(String),
    DayChanged(i64),
    UserSelected(ExpenseWithCategory),
    UserDismissed,
    RefreshRequested,
}

fn with_day(state: &DailyUiState, source: Arc<[ExpenseWithCategory]>, day: i64, tz: &Tz) -> DailyUiState {
    let items = filter_by_day(&source, day, tz);
    let total = items.iter().fold(0u64, |acc, e| acc.saturating_add(e.amount));
    let selected_item = reselect(state.selected_item.as_ref(), &items);
    DailyUiState {
        is_loading: false,
        day,
        source,
        items,
        total,
        selected_item,
        error: None,
    }
}

/// Compute the next snapshot; calendar days are taken in `tz`
pub fn reduce(state: &DailyUiState, event: DailyEvent, tz: &Tz) -> DailyUiState {
    match event {
        DailyEvent::DataArrived(all) => with_day(state, Arc::from(all), state.day, tz),
        DailyEvent::DayChanged(day) => {
            let next = with_day(state, state.source.clone(), day, tz);
            // Still waiting for the first delivery
            DailyUiState {
                is_loading: state.is_loading,
                error: state.error.clone(),
                ..next
            }
        }
        DailyEvent::LoadFailed(message) => DailyUiState {
            is_loading: false,
            error: Some(message),
            ..state.clone()
        },
        DailyEvent::UserSelected(item) => DailyUiState {
            selected_item: Some(item),
            ..state.clone()
        },
        DailyEvent::UserDismissed => DailyUiState {
            selected_item: None,
            ..state.clone()
        },
        DailyEvent::RefreshRequested => DailyUiState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
    }
}
