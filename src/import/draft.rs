use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::foods::dto::FoodInput;
use crate::validate::non_blank as text;

/// A partially known food, as read from a label or a public database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodDraft {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub sugar: Option<f64>,
    pub fiber: Option<f64>,
}

fn number(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl FoodDraft {
    /// Drops values that are not present: blank text and non-finite numbers.
    pub fn cleaned(self) -> Self {
        Self {
            name: text(self.name),
            brand: text(self.brand),
            description: text(self.description),
            image: text(self.image),
            serving_size: number(self.serving_size),
            serving_unit: text(self.serving_unit),
            calories: number(self.calories),
            protein: number(self.protein),
            fat: number(self.fat),
            carbs: number(self.carbs),
            sugar: number(self.sugar),
            fiber: number(self.fiber),
        }
    }

    /// Merges drafts field by field; the first present value wins.
    pub fn merge(drafts: impl IntoIterator<Item = FoodDraft>) -> FoodDraft {
        drafts
            .into_iter()
            .map(FoodDraft::cleaned)
            .fold(FoodDraft::default(), |acc, next| FoodDraft {
                name: acc.name.or(next.name),
                brand: acc.brand.or(next.brand),
                description: acc.description.or(next.description),
                image: acc.image.or(next.image),
                serving_size: acc.serving_size.or(next.serving_size),
                serving_unit: acc.serving_unit.or(next.serving_unit),
                calories: acc.calories.or(next.calories),
                protein: acc.protein.or(next.protein),
                fat: acc.fat.or(next.fat),
                carbs: acc.carbs.or(next.carbs),
                sugar: acc.sugar.or(next.sugar),
                fiber: acc.fiber.or(next.fiber),
            })
    }

    /// True when at least one of calories, protein, fat or carbs is positive.
    pub fn has_macro_data(&self) -> bool {
        [self.calories, self.protein, self.fat, self.carbs]
            .into_iter()
            .any(|v| v.unwrap_or(0.0) > 0.0)
    }

    /// Turns the draft into a create request. Missing sugar counts as zero;
    /// every other required field must be present.
    pub fn into_input(self) -> CoreResult<FoodInput> {
        let draft = self.cleaned();
        let mut missing = Vec::new();
        if draft.name.is_none() {
            missing.push("name");
        }
        if draft.serving_size.is_none() {
            missing.push("serving_size");
        }
        if draft.serving_unit.is_none() {
            missing.push("serving_unit");
        }
        for (field, value) in [
            ("calories", draft.calories),
            ("protein", draft.protein),
            ("fat", draft.fat),
            ("carbs", draft.carbs),
        ] {
            if value.is_none() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return Err(CoreError::invalid(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        Ok(FoodInput {
            name: draft.name.unwrap_or_default(),
            brand: draft.brand,
            description: draft.description,
            image: draft.image,
            serving_size: draft.serving_size.unwrap_or_default(),
            serving_unit: draft.serving_unit.unwrap_or_default(),
            calories: draft.calories.unwrap_or_default(),
            protein: draft.protein.unwrap_or_default(),
            fat: draft.fat.unwrap_or_default(),
            carbs: draft.carbs.unwrap_or_default(),
            sugar: draft.sugar.unwrap_or(0.0),
            fiber: draft.fiber,
        })
    }
}
