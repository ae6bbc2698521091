//! Gallery screen snapshot and its reducer
//!
//! `GalleryUiState` is an immutable value. Every transition goes through
//! [`reduce`], which returns a fresh snapshot and never edits the old one.
//! The detail flag is derived from the selection, so "detail shown without a
//! selected item" cannot be represented.

use super::expense::{ExpenseId, ExpenseWithCategory};

/// Everything the gallery renderer needs at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryUiState {
    is_loading: bool,
    items: Vec<ExpenseWithCategory>,
    selected_item: Option<ExpenseWithCategory>,
    total: u64,
    error: Option<String>,
}

impl Default for GalleryUiState {
    fn default() -> Self {
        Self {
            is_loading: true,
            items: Vec::new(),
            selected_item: None,
            total: 0,
            error: None,
        }
    }
}

impl GalleryUiState {
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Items with photos, newest first
    pub fn items(&self) -> &[ExpenseWithCategory] {
        &self.items
    }

    pub fn selected_item(&self) -> Option<&ExpenseWithCategory> {
        self.selected_item.as_ref()
    }

    /// Sum of all item amounts, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn show_detail(&self) -> bool {
        self.selected_item.is_some()
    }

    /// Last query failure, cleared by the next successful load or a refresh
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Inputs to the gallery state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent {
    /// The repository delivered a new collection
    DataArrived(Vec<ExpenseWithCategory>),
    /// The repository query failed
    LoadFailed(String),
    /// The user opened the detail of an item
    UserSelected(ExpenseWithCategory),
    /// The user closed the detail
    UserDismissed,
    /// A new query is about to be issued
    RefreshRequested,
}

/// Sort newest first; ties keep the repository's order
pub(crate) fn newest_first(mut items: Vec<ExpenseWithCategory>) -> Vec<ExpenseWithCategory> {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items
}

/// Fresh copy of the selected item from new data, if it still exists
pub(crate) fn reselect(
    selected: Option<&ExpenseWithCategory>,
    items: &[ExpenseWithCategory],
) -> Option<ExpenseWithCategory> {
    let id: ExpenseId = selected?.id;
    items.iter().find(|item| item.id == id).cloned()
}

/// Compute the next snapshot
pub fn reduce(state: &GalleryUiState, event: GalleryEvent) -> GalleryUiState {
    match event {
        GalleryEvent::DataArrived(items) => {
            let items = newest_first(items);
            GalleryUiState {
                is_loading: false,
                selected_item: reselect(state.selected_item.as_ref(), &items),
                total: items.iter().fold(0u64, |acc, e| acc.saturating_add(e.amount)),
                items,
                error: None,
            }
        }
        GalleryEvent::LoadFailed(message) => GalleryUiState {
            is_loading: false,
            error: Some(message),
            ..state.clone()
        },
        GalleryEvent::UserSelected(item) => GalleryUiState {
            selected_item: Some(item),
            ..state.clone()
        },
        GalleryEvent::UserDismissed => GalleryUiState {
            selected_item: None,
            ..state.clone()
        },
        GalleryEvent::RefreshRequested => GalleryUiState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::expense::sample;

    fn assert_detail_invariant(state: &GalleryUiState) {
        assert_eq!(state.show_detail(), state.selected_item().is_some());
    }

    #[test]
    fn test_initial_state_is_loading() {
        let state = GalleryUiState::default();
        assert!(state.is_loading());
        assert!(state.items().is_empty());
        assert!(state.selected_item().is_none());
        assert!(!state.show_detail());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_empty_data_clears_loading() {
        let state = reduce(&GalleryUiState::default(), GalleryEvent::DataArrived(vec![]));
        assert!(!state.is_loading());
        assert!(state.items().is_empty());
        assert!(!state.show_detail());
        assert_detail_invariant(&state);
    }

    #[test]
    fn test_data_sorted_newest_first() {
        let e1 = sample(1, "E1", 100, 100);
        let e2 = sample(2, "E2", 200, 200);
        let state = reduce(
            &GalleryUiState::default(),
            GalleryEvent::DataArrived(vec![e1.clone(), e2.clone()]),
        );
        assert_eq!(state.items(), &[e2, e1]);
    }

    #[test]
    fn test_select_then_dismiss_keeps_items() {
        let e1 = sample(1, "E1", 100, 100);
        let e2 = sample(2, "E2", 200, 200);
        let loaded = reduce(
            &GalleryUiState::default(),
            GalleryEvent::DataArrived(vec![e1, e2.clone()]),
        );

        let selected = reduce(&loaded, GalleryEvent::UserSelected(e2.clone()));
        assert!(selected.show_detail());
        assert_eq!(selected.selected_item(), Some(&e2));
        assert_detail_invariant(&selected);

        let dismissed = reduce(&selected, GalleryEvent::UserDismissed);
        assert!(!dismissed.show_detail());
        assert!(dismissed.selected_item().is_none());
        assert_eq!(dismissed.items(), loaded.items());
        assert_detail_invariant(&dismissed);
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let loaded = reduce(
            &GalleryUiState::default(),
            GalleryEvent::DataArrived(vec![sample(1, "E1", 1, 1)]),
        );
        let once = reduce(&loaded, GalleryEvent::UserDismissed);
        let twice = reduce(&once, GalleryEvent::UserDismissed);
        assert_eq!(once, loaded);
        assert_eq!(twice, loaded);
    }

    #[test]
    fn test_selection_survives_when_item_still_present() {
        let e1 = sample(1, "E1", 100, 100);
        let loaded = reduce(
            &GalleryUiState::default(),
            GalleryEvent::DataArrived(vec![e1.clone()]),
        );
        let selected = reduce(&loaded, GalleryEvent::UserSelected(e1));

        let mut renamed = sample(1, "E1 renamed", 150, 100);
        renamed.category_name = None;
        let updated = reduce(
            &selected,
            GalleryEvent::DataArrived(vec![renamed.clone(), sample(3, "E3", 1, 300)]),
        );
        assert!(updated.show_detail());
        assert_eq!(updated.selected_item(), Some(&renamed));
    }

    #[test]
    fn test_selection_closes_when_item_disappears() {
        let e1 = sample(1, "E1", 100, 100);
        let selected = reduce(
            &reduce(
                &GalleryUiState::default(),
                GalleryEvent::DataArrived(vec![e1.clone()]),
            ),
            GalleryEvent::UserSelected(e1),
        );

        let updated = reduce(
            &selected,
            GalleryEvent::DataArrived(vec![sample(2, "E2", 1, 200)]),
        );
        assert!(!updated.show_detail());
        assert_detail_invariant(&updated);
    }

    #[test]
    fn test_refresh_returns_to_loading_then_repopulates() {
        let loaded = reduce(
            &GalleryUiState::default(),
            GalleryEvent::DataArrived(vec![sample(1, "E1", 1, 1)]),
        );
        let refreshing = reduce(&loaded, GalleryEvent::RefreshRequested);
        assert!(refreshing.is_loading());

        let reloaded = reduce(
            &refreshing,
            GalleryEvent::DataArrived(vec![sample(2, "E2", 2, 2)]),
        );
        assert!(!reloaded.is_loading());
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.items()[0].product_name, "E2");
    }

    #[test]
    fn test_load_failure_keeps_items_and_clears_on_success() {
        let loaded = reduce(
            &GalleryUiState::default(),
            GalleryEvent::DataArrived(vec![sample(1, "E1", 1, 1)]),
        );
        let failed = reduce(&loaded, GalleryEvent::LoadFailed("disk gone".to_string()));
        assert!(!failed.is_loading());
        assert_eq!(failed.error(), Some("disk gone"));
        assert_eq!(failed.items(), loaded.items());

        let recovered = reduce(&failed, GalleryEvent::DataArrived(vec![]));
        assert!(recovered.error().is_none());
    }

    #[test]
    fn test_total_saturates() {
        let state = reduce(
            &GalleryUiState::default(),
            GalleryEvent::DataArrived(vec![sample(1, "Car", u64::MAX, 100), sample(2, "Gum", 1, 200)]),
        );
        assert_eq!(state.total(), u64::MAX);
    }
}
