use serde::{Deserialize, Serialize};

use super::repo_types::{Food, FoodOrder};

/// Request body for creating or replacing a food.
#[derive(Debug, Clone, Deserialize)]
pub struct FoodInput {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: f64,
    #[serde(default)]
    pub fiber: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListFoodsQuery {
    #[serde(default)]
    pub order: FoodOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServingSizeChange {
    pub previous: f64,
    pub next: f64,
}

/// Response to an update. `serving_size_change` is present when the serving
/// size was edited, so the client can offer to rescale logged entries.
#[derive(Debug, Serialize)]
pub struct UpdatedFoodResponse {
    pub food: Food,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size_change: Option<ServingSizeChange>,
}

#[derive(Debug, Deserialize)]
pub struct RescaleRequest {
    pub previous_serving_size: f64,
    pub next_serving_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RescaleResponse {
    pub multiplier: f64,
    pub rescaled: u64,
}
