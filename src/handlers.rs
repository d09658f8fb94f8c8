use crate::errors::AppError;
use crate::events::UiEvent;
use crate::models::{ClickTarget, ExpenseForm, ExpenseRecord, TotalEntry, View};
use crate::state::AppState;
use crate::ui::{render_index, render_series};
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let tracker = state.tracker.lock().await;
    Html(render_index(tracker.view(), &state.categories))
}

pub async fn series_page(State(state): State<AppState>) -> Html<String> {
    let canvas = state.series.lock().await;
    Html(render_series(canvas.latest()))
}

pub async fn list_expenses(State(state): State<AppState>) -> Json<Vec<ExpenseRecord>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.store().records().to_vec())
}

pub async fn get_totals(State(state): State<AppState>) -> Json<Vec<TotalEntry>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.view().totals.clone())
}

pub async fn add_expense(
    State(state): State<AppState>,
    Json(form): Json<ExpenseForm>,
) -> Result<Json<View>, AppError> {
    Ok(Json(dispatch(&state, UiEvent::Submit(form)).await?))
}

pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<ExpenseForm>,
) -> Result<Redirect, AppError> {
    dispatch(&state, UiEvent::Submit(form)).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<View>, AppError> {
    Ok(Json(dispatch(&state, UiEvent::Click(ClickTarget::delete(id))).await?))
}

pub async fn list_click(
    State(state): State<AppState>,
    Json(target): Json<ClickTarget>,
) -> Result<Json<View>, AppError> {
    Ok(Json(dispatch(&state, UiEvent::Click(target)).await?))
}

async fn dispatch(state: &AppState, event: UiEvent) -> Result<View, AppError> {
    let mut tracker = state.tracker.lock().await;
    state.dispatcher.dispatch(&mut tracker, &event)?;
    Ok(tracker.view().clone())
}
