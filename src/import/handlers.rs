use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{ImportFoodRequest, PublicFoodsQuery, PublicFoodsResponse};
use super::services;
use crate::{auth::AuthUser, error::CoreError, foods::repo_types::Food, state::AppState};

pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/foods/import", post(import_food))
        .route("/public-foods", get(search_public_foods))
}

#[instrument(skip(state))]
pub async fn search_public_foods(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<PublicFoodsQuery>,
) -> Result<Json<PublicFoodsResponse>, CoreError> {
    let foods = services::search_public_foods(state.foods_source.as_ref(), &q.query).await?;
    debug!(%user_id, results = foods.len(), "public food search");
    Ok(Json(PublicFoodsResponse { foods }))
}

#[instrument(skip(state, body))]
pub async fn import_food(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<ImportFoodRequest>,
) -> Result<(StatusCode, Json<Food>), CoreError> {
    let food = services::import_food(state.store.as_ref(), user_id, body.drafts).await?;
    Ok((StatusCode::CREATED, Json(food)))
}
