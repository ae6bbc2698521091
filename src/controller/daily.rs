//! Daily screen controller
//!
//! Same subscription discipline as the gallery controller, over the full
//! expense collection, plus the displayed day.

use crate::model::daily::{reduce, DailyEvent, DailyUiState};
use crate::model::expense::ExpenseWithCategory;
use crate::services::day_filter::shift_day;
use crate::services::repository::{ExpenseRepository, Subscription};
use chrono_tz::Tz;
use std::sync::Arc;

pub struct DailyController {
    repository: Arc<dyn ExpenseRepository>,
    subscription: Option<Subscription>,
    state: Arc<DailyUiState>,
    tz: Tz,
}

impl DailyController {
    pub fn new(repository: Arc<dyn ExpenseRepository>, day: i64, tz: Tz) -> Self {
        let mut controller = Self {
            repository,
            subscription: None,
            state: Arc::new(DailyUiState::new(day)),
            tz,
        };
        controller.subscribe();
        controller
    }

    pub fn snapshot(&self) -> Arc<DailyUiState> {
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
                Ok(items) => DailyEvent::DataArrived(items),
                Err(e) => {
                    tracing::warn!("daily query failed: {}", e);
                    DailyEvent::LoadFailed(e.to_string())
                }
            };
            changed |= self.apply(event);
        }
        changed
    }

    pub fn show_detail(&mut self, item: ExpenseWithCategory) {
        self.apply(DailyEvent::UserSelected(item));
    }

    pub fn hide_detail(&mut self) {
        self.apply(DailyEvent::UserDismissed);
    }

    pub fn refresh(&mut self) {
        tracing::info!("daily refresh");
        self.apply(DailyEvent::RefreshRequested);
        self.subscribe();
    }

    /// Show the day containing `day`
    pub fn set_day(&mut self, day: i64) {
        self.apply(DailyEvent::DayChanged(day));
    }

    pub fn next_day(&mut self) {
        self.set_day(shift_day(self.state.day(), 1, &self.tz));
    }

    pub fn prev_day(&mut self) {
        self.set_day(shift_day(self.state.day(), -1, &self.tz));
    }

    /// Delete through the repository and close the detail if it showed the item
    pub fn delete_expense(&mut self, item: &ExpenseWithCategory) {
        if self.state.selected_item().map(|s| s.id) == Some(item.id) {
            self.apply(DailyEvent::UserDismissed);
        }
        self.repository.delete(item.id);
    }

    /// Day the add-expense form should use
    pub fn add_expense_request(&self) -> i64 {
        self.state.day()
    }

    pub fn teardown(&mut self) {
        self.subscription = None;
    }

    fn subscribe(&mut self) {
        self.subscription = None;
        self.subscription = Some(self.repository.observe_expenses_with_category());
    }

    fn apply(&mut self, event: DailyEvent) -> bool {
        let next = reduce(&self.state, event, &self.tz);
        if next == *self.state {
            return false;
        }
        self.state = Arc::new(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::expense::{Category, CategoryId, Expense, ExpenseId, NewExpense};
    use crate::services::repository::LocalRepository;
    use chrono_tz::Asia::Seoul;

    /// 2024-03-05 12:00 in Seoul
    const NOON: i64 = 1_709_607_600_000;
    const DAY: i64 = 86_400_000;

    fn expense(id: u64, name: &str, amount: u64, timestamp: i64) -> Expense {
        Expense {
            id: ExpenseId(id),
            product_name: name.to_string(),
            amount,
            category_id: Some(CategoryId(2)),
            timestamp,
            photo_uri: None,
        }
    }

    fn controller() -> (Arc<LocalRepository>, DailyController) {
        let repo = Arc::new(LocalRepository::in_memory(
            vec![
                expense(1, "lunch", 9_000, NOON),
                expense(2, "subway", 1_400, NOON - 3 * 3_600_000),
                expense(3, "dinner", 20_000, NOON - DAY),
            ],
            Category::defaults(),
        ));
        let mut controller = DailyController::new(repo.clone(), NOON, Seoul);
        controller.poll();
        (repo, controller)
    }

    #[test]
    fn test_shows_selected_day_only() {
        let (_, controller) = controller();
        let state = controller.snapshot();
        assert!(!state.is_loading());
        assert_eq!(state.items().len(), 2);
        assert_eq!(state.items()[0].product_name, "lunch");
        assert_eq!(state.items()[0].category_name.as_deref(), Some("교통"));
        assert_eq!(state.total(), 10_400);
    }

    #[test]
    fn test_day_navigation() {
        let (_, mut controller) = controller();
        controller.prev_day();
        let state = controller.snapshot();
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.items()[0].product_name, "dinner");

        controller.next_day();
        controller.next_day();
        assert!(controller.snapshot().items().is_empty());
        assert_eq!(controller.snapshot().total(), 0);
    }

    #[test]
    fn test_delete_closes_detail_and_updates_total() {
        let (_, mut controller) = controller();
        let lunch = controller.snapshot().items()[0].clone();
        controller.show_detail(lunch.clone());
        assert!(controller.snapshot().show_detail());

        controller.delete_expense(&lunch);
        assert!(!controller.snapshot().show_detail());

        controller.poll();
        let state = controller.snapshot();
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.total(), 1_400);
    }

    #[test]
    fn test_inserted_expense_appears() {
        let (repo, mut controller) = controller();
        let at = controller.add_expense_request() + 3_600_000;
        repo.insert(
            NewExpense {
                product_name: "snack".to_string(),
                amount: 600,
                category_id: None,
                photo_uri: None,
            },
            at,
        )
        .unwrap();

        assert!(controller.poll());
        let state = controller.snapshot();
        assert_eq!(state.items()[0].product_name, "snack");
        assert_eq!(state.total(), 11_000);
    }

    #[test]
    fn test_teardown_and_drop_release_subscription() {
        let (repo, mut controller) = controller();
        assert_eq!(repo.subscriber_count(), 1);
        controller.refresh();
        assert_eq!(repo.subscriber_count(), 1);
        assert!(controller.snapshot().is_loading());
        controller.poll();
        assert!(!controller.snapshot().is_loading());

        drop(controller);
        assert_eq!(repo.subscriber_count(), 0);
    }
}
