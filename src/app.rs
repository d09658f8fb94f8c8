use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/expenses", post(handlers::submit_form))
        .route("/series", get(handlers::series_page))
        .route(
            "/api/expenses",
            get(handlers::list_expenses).post(handlers::add_expense),
        )
        .route("/api/expenses/:id", delete(handlers::delete_expense))
        .route("/api/list/click", post(handlers::list_click))
        .route("/api/totals", get(handlers::get_totals))
        .with_state(state)
}
