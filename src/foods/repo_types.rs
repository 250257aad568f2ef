use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::Nutrient;

/// A user-owned reference food. Macro values are per serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Food {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub serving_size: f64,   // strictly positive
    pub serving_unit: String, // "g", "ml", "piece", ...
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: f64,
    pub fiber: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub touched_at: OffsetDateTime, // last time an entry referenced this food
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Food {
    /// Per-serving amount of a nutrient; an absent fiber value counts as zero.
    pub fn per_serving(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Fat => self.fat,
            Nutrient::Carbs => self.carbs,
            Nutrient::Sugar => self.sugar,
            Nutrient::Fiber => self.fiber.unwrap_or(0.0),
        }
    }
}

/// Validated, normalized fields for creating or fully replacing a food.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodFields {
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: f64,
    pub fiber: Option<f64>,
}

/// Why a rescale of a food's entries was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescaleRejection {
    FoodMissing,
    /// Some scaled quantity would be zero or not finite.
    OutOfRange,
}

/// True when `quantity * multiplier` is still a valid entry quantity.
pub fn scales_in_range(quantity: f64, multiplier: f64) -> bool {
    let scaled = quantity * multiplier;
    scaled.is_finite() && scaled > 0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodOrder {
    #[default]
    Name,
    Recent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_quantity_must_stay_positive_and_finite() {
        assert!(scales_in_range(3.0, 100.0 / 30.0));
        assert!(!scales_in_range(1.0, 0.0));
        assert!(!scales_in_range(1e-300, 1e-300));
        assert!(!scales_in_range(1e300, 1e300));
        assert!(!scales_in_range(1.0, f64::NAN));
    }
}
