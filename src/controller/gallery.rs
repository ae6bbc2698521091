//! Gallery state controller
//!
//! Owns the gallery snapshot and the repository subscription feeding it.
//! Repository deliveries are queued on the subscription channel and applied
//! by [`GalleryController::poll`] on the UI thread, so the snapshot has a
//! single writer.

use crate::model::expense::ExpenseWithCategory;
use crate::model::gallery::{reduce, GalleryEvent, GalleryUiState};
use crate::services::repository::{ExpenseRepository, Subscription};
use std::sync::Arc;

pub struct GalleryController {
    repository: Arc<dyn ExpenseRepository>,
    subscription: Option<Subscription>,
    state: Arc<GalleryUiState>,
}

impl GalleryController {
    /// Create the controller and subscribe right away
    pub fn new(repository: Arc<dyn ExpenseRepository>) -> Self {
        let mut controller = Self {
            repository,
            subscription: None,
            state: Arc::new(GalleryUiState::default()),
        };
        controller.subscribe();
        controller
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<GalleryUiState> {
        Arc::clone(&self.state)
    }

    /// Apply every pending delivery; returns whether the snapshot changed
    pub fn poll(&mut self) -> bool {
        let Some(subscription) = &self.subscription else {
            return false;
        };

        let mut changed = false;
        for result in subscription.drain() {
            let event = match result {
                Ok(items) => GalleryEvent::DataArrived(items),
                Err(e) => {
                    tracing::warn!("gallery query failed: {}", e);
                    GalleryEvent::LoadFailed(e.to_string())
                }
            };
            changed |= self.apply(event);
        }
        changed
    }

    pub fn show_detail(&mut self, item: ExpenseWithCategory) {
        tracing::debug!("gallery detail for {}", item.id);
        self.apply(GalleryEvent::UserSelected(item));
    }

    /// Close the detail; no-op when none is shown
    pub fn hide_detail(&mut self) {
        self.apply(GalleryEvent::UserDismissed);
    }

    /// Go back to loading and issue a fresh query
    ///
    /// The previous subscription is released first, so only the newest query
    /// can deliver.
    pub fn refresh(&mut self) {
        tracing::info!("gallery refresh");
        self.apply(GalleryEvent::RefreshRequested);
        self.subscribe();
    }

    /// Ask the repository to delete the item; the detail closes once the
    /// updated collection arrives without it
    pub fn delete_expense(&self, item: &ExpenseWithCategory) {
        self.repository.delete(item.id);
    }

    /// Release the subscription; no further deliveries are applied
    pub fn teardown(&mut self) {
        self.subscription = None;
    }

    fn subscribe(&mut self) {
        self.subscription = None;
        self.subscription = Some(self.repository.observe_expenses_with_photos_and_category());
    }

    fn apply(&mut self, event: GalleryEvent) -> bool {
        let next = reduce(&self.state, event);
        if next == *self.state {
            return false;
        }
        self.state = Arc::new(next);
        true
    }
}
