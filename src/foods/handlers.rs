use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{FoodInput, ListFoodsQuery, RescaleRequest, RescaleResponse, UpdatedFoodResponse};
use super::repo_types::Food;
use super::services;
use crate::{auth::AuthUser, entries, entries::repo_types::Entry, error::CoreError, state::AppState};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route("/foods/:id", get(get_food).put(update_food))
        .route("/foods/:id/rescale-entries", post(rescale_entries))
        .route("/foods/:id/entries", get(food_entries))
}

#[instrument(skip(state))]
pub async fn list_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListFoodsQuery>,
) -> Result<Json<Vec<Food>>, CoreError> {
    let foods = services::list_foods(state.store.as_ref(), user_id, q.order).await?;
    Ok(Json(foods))
}

#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<FoodInput>,
) -> Result<(StatusCode, Json<Food>), CoreError> {
    let food = services::create_food(state.store.as_ref(), user_id, body).await?;
    Ok((StatusCode::CREATED, Json(food)))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Food>, CoreError> {
    let food = services::get_food(state.store.as_ref(), user_id, id).await?;
    Ok(Json(food))
}

#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<FoodInput>,
) -> Result<Json<UpdatedFoodResponse>, CoreError> {
    let updated = services::update_food(state.store.as_ref(), user_id, id, body).await?;
    Ok(Json(updated))
}

/// Explicit, user-confirmed rewrite of historical quantities.
#[instrument(skip(state))]
pub async fn rescale_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<RescaleRequest>,
) -> Result<Json<RescaleResponse>, CoreError> {
    let outcome = services::rescale_entries(
        state.store.as_ref(),
        user_id,
        id,
        body.previous_serving_size,
        body.next_serving_size,
    )
    .await?;
    Ok(Json(outcome))
}

#[instrument(skip(state))]
pub async fn food_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Entry>>, CoreError> {
    let entries = entries::services::entries_for_food(state.store.as_ref(), user_id, id).await?;
    Ok(Json(entries))
}
