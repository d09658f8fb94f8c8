use crate::errors::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A spending category label such as `Food`. Always trimmed and non-empty,
/// including when read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Returns `None` for a blank label.
    pub fn new(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            None
        } else {
            Some(Self(label.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Category {
    type Error = ValidationError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::new(&label).ok_or(ValidationError::MissingCategory)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
}

/// An expense that passed the form policy and is ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
}

/// Form fields exactly as the user typed them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
}

/// What the delegated list handler saw: the clicked control and the id of
/// the row enclosing it, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClickTarget {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub row_id: Option<String>,
}

impl ClickTarget {
    pub fn delete(id: i64) -> Self {
        Self {
            action: Some("delete".to_string()),
            row_id: Some(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalEntry {
    pub category: Category,
    pub total: Decimal,
    pub color: &'static str,
}

/// Everything the page needs after a render pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct View {
    pub count: usize,
    pub rows_html: String,
    pub totals: Vec<TotalEntry>,
    pub legend_html: String,
    pub chart_svg: String,
}
