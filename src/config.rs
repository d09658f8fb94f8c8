//! Settings read from the environment at startup.

use crate::form::{ValidationMode, ValidationPolicy};
use crate::models::Category;
use crate::series::DEFAULT_SERIES_URL;
use std::collections::HashSet;
use std::{env, path::PathBuf};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CATEGORIES: [&str; 5] = ["Food", "Transport", "Entertainment", "Utilities", "Other"];

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    /// `None` disables the startup series fetch.
    pub series_url: Option<String>,
    pub categories: Vec<Category>,
    pub validation: ValidationMode,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_dir = lookup("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let series_url = match lookup("SERIES_URL") {
            Some(url) if url.trim().is_empty() => None,
            Some(url) => Some(url.trim().to_string()),
            None => Some(DEFAULT_SERIES_URL.to_string()),
        };

        let mut categories: Vec<Category> = lookup("EXPENSE_CATEGORIES")
            .map(|value| value.split(',').filter_map(Category::new).collect())
            .unwrap_or_default();
        let mut seen = HashSet::new();
        categories.retain(|category| seen.insert(category.clone()));
        if categories.is_empty() {
            categories = DEFAULT_CATEGORIES.iter().filter_map(|c| Category::new(c)).collect();
        }

        let validation = match lookup("EXPENSE_VALIDATION") {
            Some(value) => value.parse().unwrap_or_else(|err| {
                warn!("{err}, using strict validation");
                ValidationMode::Strict
            }),
            None => ValidationMode::Strict,
        };

        Self {
            port,
            data_dir,
            series_url,
            categories,
            validation,
        }
    }

    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy::new(self.validation, self.categories.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.series_url.as_deref(), Some(DEFAULT_SERIES_URL));
        assert_eq!(config.categories.len(), 5);
        assert_eq!(config.validation, ValidationMode::Strict);
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("PORT", "9001"),
            ("APP_DATA_DIR", "/tmp/expenses"),
            ("SERIES_URL", ""),
            ("EXPENSE_CATEGORIES", " Rent, ,Food "),
            ("EXPENSE_VALIDATION", "lenient"),
        ]);
        assert_eq!(config.port, 9001);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/expenses"));
        assert_eq!(config.series_url, None);
        let labels: Vec<&str> = config.categories.iter().map(Category::as_str).collect();
        assert_eq!(labels, ["Rent", "Food"]);
        assert_eq!(config.validation, ValidationMode::Lenient);
    }

    #[test]
    fn repeated_categories_are_listed_once() {
        let config = config(&[("EXPENSE_CATEGORIES", "Food,Rent,Food, Rent ,Other")]);
        let labels: Vec<&str> = config.categories.iter().map(Category::as_str).collect();
        assert_eq!(labels, ["Food", "Rent", "Other"]);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = config(&[("PORT", "not-a-port"), ("EXPENSE_VALIDATION", "loose")]);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.validation, ValidationMode::Strict);
    }
}
