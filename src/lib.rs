pub mod app;
pub mod chart;
pub mod config;
pub mod errors;
pub mod events;
pub mod form;
pub mod handlers;
pub mod models;
pub mod series;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod tracker;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use store::ExpenseStore;
