use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use super::dto::{EffectiveGoalQuery, EffectiveGoalResponse};
use super::repo_types::{Goal, GoalWrite};
use super::services;
use crate::{auth::AuthUser, date::LocalDate, error::CoreError, state::AppState};

pub fn goal_routes() -> Router<AppState> {
    Router::new()
        .route("/goals", get(list_goals))
        .route("/goals/effective", get(effective_goal))
        .route("/goals/:starts_on", put(upsert_goal))
}

#[instrument(skip(state))]
pub async fn list_goals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Goal>>, CoreError> {
    let goals = services::history(state.store.as_ref(), user_id).await?;
    Ok(Json(goals))
}

#[instrument(skip(state))]
pub async fn effective_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<EffectiveGoalQuery>,
) -> Result<Json<EffectiveGoalResponse>, CoreError> {
    let goal = services::resolve(state.store.as_ref(), user_id, q.date).await?;
    Ok(Json(EffectiveGoalResponse {
        date: q.date,
        daily: goal.as_ref().map(|g| g.targets.daily()),
        goal,
    }))
}

#[instrument(skip(state, body))]
pub async fn upsert_goal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(starts_on): Path<String>,
    Json(body): Json<GoalWrite>,
) -> Result<Json<Goal>, CoreError> {
    let starts_on: LocalDate = starts_on.parse()?;
    let goal = services::upsert(state.store.as_ref(), user_id, starts_on, body).await?;
    Ok(Json(goal))
}
