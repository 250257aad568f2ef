use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{FoodInput, RescaleResponse, ServingSizeChange, UpdatedFoodResponse};
use super::repo_types::{Food, FoodFields, FoodOrder, RescaleRejection};
use crate::error::{CoreError, CoreResult};
use crate::store::Store;
use crate::validate::{non_blank, non_negative, positive, required_text};

pub fn validate_food(input: FoodInput) -> CoreResult<FoodFields> {
    Ok(FoodFields {
        name: required_text("name", &input.name)?,
        brand: non_blank(input.brand),
        description: non_blank(input.description),
        image: non_blank(input.image),
        serving_size: positive("serving_size", input.serving_size)?,
        serving_unit: required_text("serving_unit", &input.serving_unit)?,
        calories: non_negative("calories", input.calories)?,
        protein: non_negative("protein", input.protein)?,
        fat: non_negative("fat", input.fat)?,
        carbs: non_negative("carbs", input.carbs)?,
        sugar: non_negative("sugar", input.sugar)?,
        fiber: input.fiber.map(|v| non_negative("fiber", v)).transpose()?,
    })
}

pub async fn create_food(store: &dyn Store, user_id: Uuid, input: FoodInput) -> CoreResult<Food> {
    let fields = validate_food(input)?;
    let food = store.insert_food(user_id, &fields).await?;
    info!(%user_id, food_id = %food.id, "food created");
    Ok(food)
}

pub async fn get_food(store: &dyn Store, user_id: Uuid, food_id: Uuid) -> CoreResult<Food> {
    store
        .get_food(user_id, food_id)
        .await?
        .ok_or_else(|| CoreError::not_found("food", food_id))
}

pub async fn list_foods(store: &dyn Store, user_id: Uuid, order: FoodOrder) -> CoreResult<Vec<Food>> {
    Ok(store.list_foods(user_id, order).await?)
}

/// Full replace of the mutable fields. Logged entries are left alone; a
/// serving-size change is reported so the caller can confirm a rescale.
pub async fn update_food(
    store: &dyn Store,
    user_id: Uuid,
    food_id: Uuid,
    input: FoodInput,
) -> CoreResult<UpdatedFoodResponse> {
    let fields = validate_food(input)?;
    let (before, food) = store
        .replace_food(user_id, food_id, &fields)
        .await?
        .ok_or_else(|| CoreError::not_found("food", food_id))?;

    let serving_size_change = (before.serving_size != food.serving_size).then_some(ServingSizeChange {
        previous: before.serving_size,
        next: food.serving_size,
    });
    info!(%user_id, %food_id, serving_size_changed = serving_size_change.is_some(), "food updated");
    Ok(UpdatedFoodResponse {
        food,
        serving_size_change,
    })
}

/// Rewrites every entry of the food so `quantity * serving_size` is
/// unchanged after the serving size moved from `previous` to `next`.
pub async fn rescale_entries(
    store: &dyn Store,
    user_id: Uuid,
    food_id: Uuid,
    previous: f64,
    next: f64,
) -> CoreResult<RescaleResponse> {
    let previous = positive("previous_serving_size", previous)?;
    let next = positive("next_serving_size", next)?;

    if previous == next {
        get_food(store, user_id, food_id).await?;
        return Ok(RescaleResponse {
            multiplier: 1.0,
            rescaled: 0,
        });
    }

    let multiplier = previous / next;
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return Err(CoreError::invalid(format!(
            "serving sizes {previous} and {next} are too far apart to rescale"
        )));
    }
    let rescaled = match store.scale_entry_quantities(user_id, food_id, multiplier).await? {
        Ok(n) => n,
        Err(RescaleRejection::FoodMissing) => return Err(CoreError::not_found("food", food_id)),
        Err(RescaleRejection::OutOfRange) => {
            warn!(%user_id, %food_id, multiplier, "rescale would leave quantities out of range");
            return Err(CoreError::invalid(
                "rescaling would leave some entry quantities out of range",
            ));
        }
    };

    info!(%user_id, %food_id, multiplier, rescaled, "entries rescaled");
    Ok(RescaleResponse { multiplier, rescaled })
}
