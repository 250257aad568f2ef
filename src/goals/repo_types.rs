use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::date::LocalDate;
use crate::entries::repo_types::MealType;
use crate::nutrition::Nutrient;

/// Macro targets; `None` means no target for that macro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
}

impl MacroTargets {
    /// Sugar is tracked but never targeted.
    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Fat => self.fat,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sugar => None,
        }
    }

    pub fn values(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("calories", self.calories),
            ("protein", self.protein),
            ("fat", self.fat),
            ("carbs", self.carbs),
            ("fiber", self.fiber),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.values().iter().all(|(_, v)| v.is_none())
    }

    /// Field-wise sum of the targets that are set; a macro stays unset only
    /// when no meal targets it.
    fn sum<'a>(parts: impl IntoIterator<Item = &'a MacroTargets> + Clone) -> MacroTargets {
        let add = |pick: fn(&MacroTargets) -> Option<f64>| {
            parts
                .clone()
                .into_iter()
                .filter_map(pick)
                .fold(None, |acc: Option<f64>, v| Some(acc.unwrap_or(0.0) + v))
        };
        MacroTargets {
            calories: add(|t| t.calories),
            protein: add(|t| t.protein),
            fat: add(|t| t.fat),
            carbs: add(|t| t.carbs),
            fiber: add(|t| t.fiber),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalTargets {
    Daily(MacroTargets),
    PerMeal {
        breakfast: MacroTargets,
        lunch: MacroTargets,
        dinner: MacroTargets,
    },
}

impl GoalTargets {
    /// Targets for the whole day.
    pub fn daily(&self) -> MacroTargets {
        match self {
            GoalTargets::Daily(t) => *t,
            GoalTargets::PerMeal {
                breakfast,
                lunch,
                dinner,
            } => MacroTargets::sum([breakfast, lunch, dinner]),
        }
    }

    /// Targets for one meal; only per-meal goals have them, and snacks never do.
    pub fn for_meal(&self, meal: MealType) -> Option<MacroTargets> {
        match (self, meal) {
            (GoalTargets::Daily(_), _) => None,
            (GoalTargets::PerMeal { breakfast, .. }, MealType::Breakfast) => Some(*breakfast),
            (GoalTargets::PerMeal { lunch, .. }, MealType::Lunch) => Some(*lunch),
            (GoalTargets::PerMeal { dinner, .. }, MealType::Dinner) => Some(*dinner),
            (GoalTargets::PerMeal { .. }, MealType::Snack) => None,
        }
    }

    pub fn all_targets(&self) -> Vec<&MacroTargets> {
        match self {
            GoalTargets::Daily(t) => vec![t],
            GoalTargets::PerMeal {
                breakfast,
                lunch,
                dinner,
            } => vec![breakfast, lunch, dinner],
        }
    }
}

/// A goal version, effective from `starts_on` until the next version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub starts_on: LocalDate,
    pub targets: GoalTargets,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct GoalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub starts_on: LocalDate,
    pub targets: Json<GoalTargets>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<GoalRow> for Goal {
    fn from(r: GoalRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            starts_on: r.starts_on,
            targets: r.targets.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// One field of a patch. Every field is tagged explicitly so that an absent
/// key never carries meaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldPatch<T> {
    Leave,
    Set(T),
    Unset,
}

impl<T: Copy> FieldPatch<T> {
    pub fn apply(&self, current: Option<T>) -> Option<T> {
        match self {
            FieldPatch::Leave => current,
            FieldPatch::Set(v) => Some(*v),
            FieldPatch::Unset => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargetsPatch {
    pub calories: FieldPatch<f64>,
    pub protein: FieldPatch<f64>,
    pub fat: FieldPatch<f64>,
    pub carbs: FieldPatch<f64>,
    pub fiber: FieldPatch<f64>,
}

impl MacroTargetsPatch {
    pub fn apply(&self, current: &MacroTargets) -> MacroTargets {
        MacroTargets {
            calories: self.calories.apply(current.calories),
            protein: self.protein.apply(current.protein),
            fat: self.fat.apply(current.fat),
            carbs: self.carbs.apply(current.carbs),
            fiber: self.fiber.apply(current.fiber),
        }
    }

    pub fn set_values(&self) -> [Option<f64>; 5] {
        let set = |p: &FieldPatch<f64>| match p {
            FieldPatch::Set(v) => Some(*v),
            _ => None,
        };
        [
            set(&self.calories),
            set(&self.protein),
            set(&self.fat),
            set(&self.carbs),
            set(&self.fiber),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalTargetsPatch {
    Daily(MacroTargetsPatch),
    PerMeal {
        breakfast: MacroTargetsPatch,
        lunch: MacroTargetsPatch,
        dinner: MacroTargetsPatch,
    },
}

impl GoalTargetsPatch {
    /// Applies the patch to targets of the same shape; `None` on a shape mismatch.
    pub fn apply(&self, current: &GoalTargets) -> Option<GoalTargets> {
        match (self, current) {
            (GoalTargetsPatch::Daily(p), GoalTargets::Daily(t)) => {
                Some(GoalTargets::Daily(p.apply(t)))
            }
            (
                GoalTargetsPatch::PerMeal {
                    breakfast: pb,
                    lunch: pl,
                    dinner: pd,
                },
                GoalTargets::PerMeal {
                    breakfast,
                    lunch,
                    dinner,
                },
            ) => Some(GoalTargets::PerMeal {
                breakfast: pb.apply(breakfast),
                lunch: pl.apply(lunch),
                dinner: pd.apply(dinner),
            }),
            _ => None,
        }
    }

    /// Targets of this patch's shape with nothing set.
    pub fn empty_targets(&self) -> GoalTargets {
        match self {
            GoalTargetsPatch::Daily(_) => GoalTargets::Daily(MacroTargets::default()),
            GoalTargetsPatch::PerMeal { .. } => GoalTargets::PerMeal {
                breakfast: MacroTargets::default(),
                lunch: MacroTargets::default(),
                dinner: MacroTargets::default(),
            },
        }
    }
}

/// How an upsert writes the version at its `starts_on`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "targets", rename_all = "snake_case")]
pub enum GoalWrite {
    Replace(GoalTargets),
    Patch(GoalTargetsPatch),
}
