use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::date::LocalDate;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    /// Display and aggregation order.
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(CoreError::invalid(format!("unknown meal type {other:?}"))),
        }
    }
}

/// One logged consumption of `quantity` servings of a food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub quantity: f64, // multiplier of the food's serving, > 0
    pub entry_date: LocalDate,
    pub meal_type: MealType,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct EntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Uuid,
    pub quantity: f64,
    pub entry_date: LocalDate,
    pub meal_type: String,
    pub note: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<EntryRow> for Entry {
    type Error = anyhow::Error;

    fn try_from(r: EntryRow) -> Result<Self, Self::Error> {
        let meal_type = r
            .meal_type
            .parse()
            .map_err(|e: CoreError| anyhow::anyhow!("entry {}: {e}", r.id))?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            food_id: r.food_id,
            quantity: r.quantity,
            entry_date: r.entry_date,
            meal_type,
            note: r.note,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated fields for creating or fully replacing an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryFields {
    pub food_id: Uuid,
    pub quantity: f64,
    pub entry_date: LocalDate,
    pub meal_type: MealType,
    pub note: Option<String>,
}

/// Why an ownership-checked entry write was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRejection {
    FoodMissing,
    EntryMissing,
}
