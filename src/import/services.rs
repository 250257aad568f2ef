use tracing::info;
use uuid::Uuid;

use super::draft::FoodDraft;
use super::usda::PublicFoodSource;
use crate::error::{CoreError, CoreResult};
use crate::foods::{repo_types::Food, services as foods};
use crate::store::Store;

/// Searches the public food database. A blank query returns nothing without
/// contacting the source.
pub async fn search_public_foods(source: &dyn PublicFoodSource, query: &str) -> CoreResult<Vec<FoodDraft>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    Ok(source.search(query).await?)
}

/// Merges the drafts and saves the result as one of the caller's foods.
pub async fn import_food(store: &dyn Store, user_id: Uuid, drafts: Vec<FoodDraft>) -> CoreResult<Food> {
    if drafts.is_empty() {
        return Err(CoreError::invalid("at least one draft is required"));
    }
    let input = FoodDraft::merge(drafts).into_input()?;
    let food = foods::create_food(store, user_id, input).await?;
    info!(%user_id, food_id = %food.id, "food imported");
    Ok(food)
}
