//! Input policy for the expense form.

use crate::errors::ValidationError;
use crate::events::{Dispatcher, EventKind, Handled, UiEvent};
use crate::models::{Category, ExpenseForm, NewExpense};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::info;

/// Largest amount one expense may carry. Keeps every list total far from
/// the `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Reject blank descriptions, non-positive amounts and unknown categories.
    #[default]
    Strict,
    /// Accept whatever the form collected as long as it can be stored.
    Lenient,
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(format!("unknown validation mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    pub mode: ValidationMode,
    pub categories: Vec<Category>,
}

impl ValidationPolicy {
    pub fn new(mode: ValidationMode, categories: Vec<Category>) -> Self {
        Self { mode, categories }
    }

    pub fn validate(&self, form: &ExpenseForm) -> Result<NewExpense, ValidationError> {
        let description = form.description.trim();
        let amount_text = form.amount.trim();
        let mut amount = Decimal::from_str(amount_text)
            .map_err(|_| ValidationError::InvalidAmount(amount_text.to_string()))?
            .round_dp(2);
        let category = Category::new(&form.category).ok_or(ValidationError::MissingCategory)?;

        if amount.is_zero() {
            amount.set_sign_positive(true);
        } else if amount.is_sign_negative() {
            return Err(ValidationError::NegativeAmount);
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(MAX_AMOUNT));
        }

        if self.mode == ValidationMode::Strict {
            if description.is_empty() {
                return Err(ValidationError::EmptyDescription);
            }
            if amount.is_zero() {
                return Err(ValidationError::NonPositiveAmount);
            }
            if !self.categories.contains(&category) {
                return Err(ValidationError::UnknownCategory(category.to_string()));
            }
        }

        Ok(NewExpense {
            description: description.to_string(),
            amount,
            category,
        })
    }
}

/// Subscribes the submit handler: validate, store, re-render.
pub fn register(dispatcher: &mut Dispatcher, policy: ValidationPolicy) {
    dispatcher.subscribe(EventKind::Submit, move |tracker, event| {
        let UiEvent::Submit(form) = event else {
            return Ok(Handled::Ignored);
        };
        let expense = policy.validate(form)?;
        let added = tracker
            .store_mut()
            .add(expense.description, expense.amount, expense.category)
            .map(|record| {
                info!(id = record.id, category = %record.category, amount = %record.amount, "added expense");
            });
        // A failed write still leaves the record in memory.
        tracker.render();
        added?;
        Ok(Handled::Changed)
    });
}
