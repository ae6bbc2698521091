//! Expense records, categories and the expense-with-category projection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an expense record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of a spending category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// Anything carrying an epoch-millisecond timestamp
pub trait Dated {
    fn timestamp_millis(&self) -> i64;
}

/// One spending event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub product_name: String,
    pub amount: u64,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Epoch milliseconds, set at creation
    pub timestamp: i64,
    #[serde(default)]
    pub photo_uri: Option<String>,
}

impl Dated for Expense {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }
}

/// Spending category with its display name and icon identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl Category {
    /// Categories used when no category file is configured
    pub fn defaults() -> Vec<Category> {
        [
            (1, "식비", "restaurant"),
            (2, "교통", "directions_car"),
            (3, "쇼핑", "shopping_cart"),
            (4, "의료", "local_hospital"),
            (5, "문화", "movie"),
            (6, "카페", "coffee"),
            (7, "기타", "more_horiz"),
        ]
        .into_iter()
        .map(|(id, name, icon)| Category {
            id: CategoryId(id),
            name: name.to_string(),
            icon: Some(icon.to_string()),
        })
        .collect()
    }
}

/// Read-only join of an expense with its category's name and icon
///
/// Absent categories are represented by `None` name/icon, never by a
/// placeholder category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseWithCategory {
    pub id: ExpenseId,
    pub product_name: String,
    pub amount: u64,
    pub category_id: Option<CategoryId>,
    pub timestamp: i64,
    pub photo_uri: Option<String>,
    pub category_name: Option<String>,
    pub icon_name: Option<String>,
}

impl ExpenseWithCategory {
    /// Join an expense with its (possibly missing) category
    pub fn join(expense: &Expense, category: Option<&Category>) -> Self {
        Self {
            id: expense.id,
            product_name: expense.product_name.clone(),
            amount: expense.amount,
            category_id: expense.category_id,
            timestamp: expense.timestamp,
            photo_uri: expense.photo_uri.clone(),
            category_name: category.map(|c| c.name.clone()),
            icon_name: category.and_then(|c| c.icon.clone()),
        }
    }
}

impl Dated for ExpenseWithCategory {
    fn timestamp_millis(&self) -> i64 {
        self.timestamp
    }
}

/// Input for creating an expense; the repository assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub product_name: String,
    pub amount: u64,
    pub category_id: Option<CategoryId>,
    pub photo_uri: Option<String>,
}

impl NewExpense {
    /// Trim fields and reject empty product names
    pub fn validate(mut self) -> Result<Self, String> {
        self.product_name = self.product_name.trim().to_string();
        if self.product_name.is_empty() {
            return Err("Product name is required".to_string());
        }
        self.photo_uri = self
            .photo_uri
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        Ok(self)
    }
}

#[cfg(test)]
pub(crate) fn sample(id: u64, name: &str, amount: u64, timestamp: i64) -> ExpenseWithCategory {
    ExpenseWithCategory {
        id: ExpenseId(id),
        product_name: name.to_string(),
        amount,
        category_id: Some(CategoryId(1)),
        timestamp,
        photo_uri: Some(format!("/photos/{}.jpg", id)),
        category_name: Some("식비".to_string()),
        icon_name: Some("restaurant".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_without_category() {
        let expense = Expense {
            id: ExpenseId(3),
            product_name: "Bus".to_string(),
            amount: 1_400,
            category_id: Some(CategoryId(99)),
            timestamp: 1_000,
            photo_uri: None,
        };

        let joined = ExpenseWithCategory::join(&expense, None);
        assert_eq!(joined.category_name, None);
        assert_eq!(joined.icon_name, None);
        assert_eq!(joined.category_id, Some(CategoryId(99)));
    }

    #[test]
    fn test_join_with_category() {
        let categories = Category::defaults();
        let expense = Expense {
            id: ExpenseId(1),
            product_name: "Kimbap".to_string(),
            amount: 3_500,
            category_id: Some(CategoryId(1)),
            timestamp: 0,
            photo_uri: Some("/tmp/receipt.jpg".to_string()),
        };

        let joined = ExpenseWithCategory::join(&expense, categories.first());
        assert_eq!(joined.category_name.as_deref(), Some("식비"));
        assert_eq!(joined.icon_name.as_deref(), Some("restaurant"));
    }

    #[test]
    fn test_new_expense_validation() {
        let blank = NewExpense {
            product_name: "   ".to_string(),
            amount: 10,
            category_id: None,
            photo_uri: None,
        };
        assert!(blank.validate().is_err());

        let ok = NewExpense {
            product_name: "  Coffee ".to_string(),
            amount: 4_500,
            category_id: None,
            photo_uri: Some("  ".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.product_name, "Coffee");
        assert_eq!(ok.photo_uri, None);
    }
}
