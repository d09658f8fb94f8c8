use crate::chart::{ChartKind, ChartOptions, ChartSpec, Dataset};
use crate::models::{Category, ExpenseRecord, TotalEntry};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Segment colours, reused in order once there are more categories.
pub const PALETTE: [&str; 5] = ["#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF"];

pub fn color_for(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Per-category sums in the order each category first appears.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    entries: Vec<(Category, Decimal)>,
}

impl CategoryTotals {
    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|(label, _)| label.as_str() == category)
            .map(|(_, total)| *total)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Category, Decimal)> {
        self.entries.iter().map(|(label, total)| (label, *total))
    }

    pub fn grand_total(&self) -> Decimal {
        self.entries
            .iter()
            .fold(Decimal::ZERO, |sum, (_, total)| sum.saturating_add(*total))
    }

    pub fn to_entries(&self) -> Vec<TotalEntry> {
        self.iter()
            .enumerate()
            .map(|(index, (category, total))| TotalEntry {
                category: category.clone(),
                total,
                color: color_for(index),
            })
            .collect()
    }
}

/// Sums saturate at the `Decimal` bounds, so a stored list whose totals do
/// not fit still renders.
pub fn compute_totals(records: &[ExpenseRecord]) -> CategoryTotals {
    let mut totals = CategoryTotals::default();
    for record in records {
        let seen = totals
            .entries
            .iter()
            .position(|(label, _)| *label == record.category);
        match seen {
            Some(index) => {
                let total = &mut totals.entries[index].1;
                *total = total.saturating_add(record.amount);
            }
            None => totals.entries.push((record.category.clone(), record.amount)),
        }
    }
    totals
}

pub fn totals_chart(totals: &CategoryTotals) -> ChartSpec {
    let labels = totals.iter().map(|(label, _)| label.to_string()).collect();
    let data = totals
        .iter()
        .map(|(_, total)| total.to_f64().unwrap_or(0.0))
        .collect();
    let background_colors = (0..totals.len()).map(|i| color_for(i).to_string()).collect();

    ChartSpec {
        kind: ChartKind::Doughnut,
        labels,
        dataset: Dataset {
            label: "Expenses by category".to_string(),
            data,
            border_color: "#ffffff".to_string(),
            background_colors,
            border_width: 1,
            fill: true,
            tension: 0.0,
        },
        options: ChartOptions::default(),
    }
}
