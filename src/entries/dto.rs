use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Entry, MealType};
use crate::date::LocalDate;
use crate::foods::repo_types::Food;
use crate::nutrition::totals::NutritionTotals;

/// Label shown for an entry whose food was deleted.
pub const DELETED_FOOD_LABEL: &str = "[deleted food]";

/// Request body for logging or replacing an entry.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryInput {
    pub food_id: Uuid,
    pub quantity: f64,
    pub entry_date: LocalDate,
    pub meal_type: MealType,
    #[serde(default)]
    pub note: Option<String>,
}

/// `?date=` for one day or `?from=&to=` for an inclusive range.
#[derive(Debug, Default, Deserialize)]
pub struct EntriesQuery {
    pub date: Option<LocalDate>,
    pub from: Option<LocalDate>,
    pub to: Option<LocalDate>,
}

/// Export filters; `meals` and `nutrients` are comma separated, empty means all.
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub from: LocalDate,
    pub to: LocalDate,
    #[serde(default)]
    pub meals: Option<String>,
    #[serde(default)]
    pub nutrients: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayEntry {
    #[serde(flatten)]
    pub entry: Entry,
    pub food_label: String,
    pub food: Option<Food>,
    /// Zero when the food is missing.
    pub totals: NutritionTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayMeal {
    pub meal_type: MealType,
    pub entries: Vec<DayEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: LocalDate,
    pub meals: Vec<DayMeal>,
}
