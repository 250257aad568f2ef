use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{DayView, EntriesQuery, EntryInput, ExportQuery};
use super::repo_types::Entry;
use super::services;
use crate::{
    auth::AuthUser, date::LocalDate, error::CoreError, nutrition::summary::DaySummary,
    state::AppState,
};

pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/entries", post(create_entry).get(list_entries))
        .route("/entries/:id", put(update_entry).delete(remove_entry))
}

pub fn day_routes() -> Router<AppState> {
    Router::new()
        .route("/days/:date", get(day_view))
        .route("/days/:date/summary", get(day_summary))
        .route("/export", get(export))
}

#[instrument(skip(state, body))]
pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<EntryInput>,
) -> Result<(StatusCode, Json<Entry>), CoreError> {
    let entry = services::create_entry(state.store.as_ref(), user_id, body).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state, body))]
pub async fn update_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<EntryInput>,
) -> Result<Json<Entry>, CoreError> {
    let entry = services::update_entry(state.store.as_ref(), user_id, id, body).await?;
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, CoreError> {
    services::remove_entry(state.store.as_ref(), user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<EntriesQuery>,
) -> Result<Json<Vec<Entry>>, CoreError> {
    let store = state.store.as_ref();
    let entries = match q {
        EntriesQuery {
            date: Some(date),
            from: None,
            to: None,
        } => services::entries_on(store, user_id, date).await?,
        EntriesQuery {
            date: None,
            from: Some(from),
            to: Some(to),
        } => services::entries_between(store, user_id, from, to).await?,
        _ => {
            warn!(%user_id, "entries query without a date or a full range");
            return Err(CoreError::invalid("pass either date or both from and to"));
        }
    };
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn day_view(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DayView>, CoreError> {
    let date: LocalDate = date.parse()?;
    let view = services::day_view(state.store.as_ref(), user_id, date).await?;
    Ok(Json(view))
}

#[instrument(skip(state))]
pub async fn day_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DaySummary>, CoreError> {
    let date: LocalDate = date.parse()?;
    let summary =
        services::day_summary(state.store.as_ref(), user_id, date, &state.config.progress).await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ExportQuery>,
) -> Result<impl IntoResponse, CoreError> {
    let markdown = services::export_markdown(
        state.store.as_ref(),
        user_id,
        q.from,
        q.to,
        q.meals.as_deref(),
        q.nutrients.as_deref(),
    )
    .await?;
    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], markdown))
}
