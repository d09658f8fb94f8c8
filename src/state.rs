use crate::chart::SvgCanvas;
use crate::config::Config;
use crate::events::Dispatcher;
use crate::form;
use crate::models::Category;
use crate::store::ExpenseStore;
use crate::tracker::Tracker;
use crate::ui;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Mutex<Tracker>>,
    pub dispatcher: Arc<Dispatcher>,
    pub series: Arc<Mutex<SvgCanvas>>,
    pub categories: Arc<Vec<Category>>,
}

impl AppState {
    pub fn new(config: &Config, store: ExpenseStore) -> Self {
        let mut dispatcher = Dispatcher::new();
        form::register(&mut dispatcher, config.validation_policy());
        ui::register(&mut dispatcher);

        Self {
            tracker: Arc::new(Mutex::new(Tracker::new(store))),
            dispatcher: Arc::new(dispatcher),
            series: Arc::new(Mutex::new(SvgCanvas::new())),
            categories: Arc::new(config.categories.clone()),
        }
    }
}
