use crate::chart::{ChartSlot, SvgCanvas};
use crate::models::View;
use crate::stats::{compute_totals, totals_chart};
use crate::store::ExpenseStore;
use crate::ui::{render_legend, render_rows};

/// Owns the expense list together with everything rendered from it.
pub struct Tracker {
    store: ExpenseStore,
    canvas: SvgCanvas,
    chart: ChartSlot,
    view: View,
}

impl Tracker {
    pub fn new(store: ExpenseStore) -> Self {
        let mut tracker = Self {
            store,
            canvas: SvgCanvas::new(),
            chart: ChartSlot::new(),
            view: View::default(),
        };
        tracker.render();
        tracker
    }

    pub fn store(&self) -> &ExpenseStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ExpenseStore {
        &mut self.store
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn live_charts(&self) -> usize {
        self.canvas.live()
    }

    /// Rebuilds rows, totals and the doughnut from the current list.
    pub fn render(&mut self) -> &View {
        let records = self.store.records();
        let totals = compute_totals(records);
        let handle = self.chart.replace(&mut self.canvas, &totals_chart(&totals));
        let entries = totals.to_entries();

        self.view = View {
            count: records.len(),
            rows_html: render_rows(records),
            legend_html: render_legend(&entries),
            totals: entries,
            chart_svg: self.canvas.svg(handle).unwrap_or_default().to_string(),
        };
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Dispatcher, Handled, UiEvent};
    use crate::form::{self, ValidationMode, ValidationPolicy};
    use crate::models::{Category, ClickTarget, ExpenseForm};
    use crate::errors::{StorageError, StoreError, TrackerError};
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::ui;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Memory storage whose writes start failing once `failing` is set.
    struct FlakyStore {
        inner: MemoryStore,
        failing: Arc<AtomicBool>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Write {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }
    }

    fn setup() -> (Tracker, Dispatcher) {
        setup_with(Box::new(MemoryStore::new()))
    }

    fn setup_with(storage: Box<dyn KeyValueStore>) -> (Tracker, Dispatcher) {
        let store = ExpenseStore::load(storage).unwrap();
        let mut dispatcher = Dispatcher::new();
        let categories = ["Food", "Transport"]
            .iter()
            .filter_map(|label| Category::new(label))
            .collect();
        form::register(
            &mut dispatcher,
            ValidationPolicy::new(ValidationMode::Strict, categories),
        );
        ui::register(&mut dispatcher);
        (Tracker::new(store), dispatcher)
    }

    fn submit(description: &str, amount: &str, category: &str) -> UiEvent {
        UiEvent::Submit(ExpenseForm {
            description: description.to_string(),
            amount: amount.to_string(),
            category: category.to_string(),
        })
    }

    fn total(tracker: &Tracker, category: &str) -> Option<Decimal> {
        tracker
            .view()
            .totals
            .iter()
            .find(|entry| entry.category.as_str() == category)
            .map(|entry| entry.total)
    }

    #[test]
    fn coffee_and_bus_scenario() {
        let (mut tracker, dispatcher) = setup();
        dispatcher.dispatch(&mut tracker, &submit("Coffee", "3.50", "Food")).unwrap();
        dispatcher.dispatch(&mut tracker, &submit("Bus", "2.00", "Transport")).unwrap();

        assert_eq!(tracker.view().count, 2);
        assert_eq!(total(&tracker, "Food"), Some(Decimal::from_str("3.50").unwrap()));
        assert_eq!(total(&tracker, "Transport"), Some(Decimal::from_str("2.00").unwrap()));
        assert!(tracker.view().rows_html.contains("Coffee"));
        assert_eq!(tracker.live_charts(), 1);
    }

    #[test]
    fn delete_click_removes_row_and_redraws() {
        let (mut tracker, dispatcher) = setup();
        dispatcher.dispatch(&mut tracker, &submit("Coffee", "3.50", "Food")).unwrap();
        dispatcher.dispatch(&mut tracker, &submit("Cookie", "1.50", "Food")).unwrap();
        assert_eq!(total(&tracker, "Food"), Some(Decimal::from_str("5.00").unwrap()));

        let id = tracker.store().records()[0].id;
        let outcome = dispatcher
            .dispatch(&mut tracker, &UiEvent::Click(ClickTarget::delete(id)))
            .unwrap();

        assert_eq!(outcome, Handled::Changed);
        assert_eq!(tracker.view().count, 1);
        assert!(!tracker.view().rows_html.contains("Coffee"));
        assert_eq!(total(&tracker, "Food"), Some(Decimal::from_str("1.50").unwrap()));
        assert_eq!(tracker.live_charts(), 1);
    }

    #[test]
    fn deleting_unknown_id_changes_nothing() {
        let (mut tracker, dispatcher) = setup();
        dispatcher.dispatch(&mut tracker, &submit("Coffee", "3.50", "Food")).unwrap();
        let before = tracker.view().clone();

        let outcome = dispatcher
            .dispatch(&mut tracker, &UiEvent::Click(ClickTarget::delete(42)))
            .unwrap();

        assert_eq!(outcome, Handled::Ignored);
        assert_eq!(tracker.view().rows_html, before.rows_html);
        assert_eq!(tracker.view().totals, before.totals);
    }

    #[test]
    fn invalid_submit_leaves_list_alone() {
        let (mut tracker, dispatcher) = setup();
        let err = dispatcher
            .dispatch(&mut tracker, &submit("", "3.50", "Food"))
            .unwrap_err();
        assert!(matches!(err, crate::errors::TrackerError::Validation(_)));
        assert!(tracker.store().is_empty());
    }

    #[test]
    fn failed_writes_still_refresh_the_view() {
        let failing = Arc::new(AtomicBool::new(false));
        let (mut tracker, dispatcher) = setup_with(Box::new(FlakyStore {
            inner: MemoryStore::new(),
            failing: Arc::clone(&failing),
        }));
        dispatcher.dispatch(&mut tracker, &submit("Coffee", "3.50", "Food")).unwrap();
        failing.store(true, Ordering::SeqCst);

        let err = dispatcher
            .dispatch(&mut tracker, &submit("Bus", "2.00", "Transport"))
            .unwrap_err();
        assert!(matches!(err, TrackerError::Store(StoreError::Storage(_))));
        assert_eq!(tracker.view().count, tracker.store().len());
        assert!(tracker.view().rows_html.contains("Bus"));
        assert_eq!(total(&tracker, "Transport"), Some(Decimal::from_str("2.00").unwrap()));

        let id = tracker.store().records()[0].id;
        let err = dispatcher
            .dispatch(&mut tracker, &UiEvent::Click(ClickTarget::delete(id)))
            .unwrap_err();
        assert!(matches!(err, TrackerError::Store(_)));
        assert_eq!(tracker.view().count, 1);
        assert!(!tracker.view().rows_html.contains("Coffee"));
        assert_eq!(total(&tracker, "Food"), None);
    }

    #[test]
    fn huge_amounts_are_rejected_before_they_reach_the_store() {
        let (mut tracker, dispatcher) = setup();
        let huge = "79228162514264337593543950335";
        for _ in 0..2 {
            let err = dispatcher
                .dispatch(&mut tracker, &submit("Yacht", huge, "Food"))
                .unwrap_err();
            assert!(matches!(err, TrackerError::Validation(_)));
        }
        assert!(tracker.store().is_empty());
    }

    #[test]
    fn stored_totals_beyond_decimal_range_still_render() {
        let mut store = ExpenseStore::load(Box::new(MemoryStore::new())).unwrap();
        let food = Category::new("Food").unwrap();
        store.add("Yacht", Decimal::MAX, food.clone()).unwrap();
        store.add("Island", Decimal::MAX, food).unwrap();

        let tracker = Tracker::new(store);
        assert_eq!(tracker.view().count, 2);
        assert_eq!(total(&tracker, "Food"), Some(Decimal::MAX));
        assert_eq!(tracker.live_charts(), 1);
    }
}
