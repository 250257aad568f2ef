use serde::Serialize;

use super::progress::{calories_from_macros, percent_of_goal, ProgressStatus, ProgressThresholds};
use super::totals::{index_foods, meal_totals, NutritionTotals};
use super::Nutrient;
use crate::date::LocalDate;
use crate::entries::repo_types::{Entry, MealType};
use crate::foods::repo_types::Food;
use crate::goals::repo_types::{Goal, MacroTargets};

/// Nutrients that goals can target, in display order.
pub const TARGETED: [Nutrient; 5] = [
    Nutrient::Calories,
    Nutrient::Protein,
    Nutrient::Fat,
    Nutrient::Carbs,
    Nutrient::Fiber,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroProgress {
    pub nutrient: Nutrient,
    pub consumed: f64,
    pub goal: Option<f64>,
    pub percent: Option<f64>,
    pub status: Option<ProgressStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSummary {
    pub meal_type: MealType,
    pub entry_count: usize,
    pub totals: NutritionTotals,
    pub goal: Option<MacroTargets>,
    pub progress: Vec<MacroProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: LocalDate,
    pub meals: Vec<MealSummary>,
    pub totals: NutritionTotals,
    pub goal: Option<Goal>,
    pub progress: Vec<MacroProgress>,
    /// Atwater estimate of the daily macro targets; approximate when some
    /// macros have no target.
    pub goal_calories_from_macros: Option<f64>,
}

pub fn progress_against(
    totals: &NutritionTotals,
    targets: Option<&MacroTargets>,
    thresholds: &ProgressThresholds,
) -> Vec<MacroProgress> {
    TARGETED
        .into_iter()
        .map(|nutrient| {
            let consumed = totals.get(nutrient);
            let goal = targets.and_then(|t| t.get(nutrient));
            let percent = percent_of_goal(consumed, goal);
            MacroProgress {
                nutrient,
                consumed,
                goal,
                percent,
                status: percent.map(|p| thresholds.classify(p)),
            }
        })
        .collect()
}

/// Builds the day view: per-meal totals and progress, day totals, and progress
/// against the goal in effect on `date`. Entries dated elsewhere are ignored.
pub fn summarize_day(
    date: LocalDate,
    entries: &[Entry],
    foods: &[Food],
    goal: Option<&Goal>,
    thresholds: &ProgressThresholds,
) -> DaySummary {
    let day_entries: Vec<Entry> = entries
        .iter()
        .filter(|e| e.entry_date == date)
        .cloned()
        .collect();
    let index = index_foods(foods);

    let meals: Vec<MealSummary> = MealType::ALL
        .into_iter()
        .map(|meal| {
            let totals = meal_totals(&day_entries, &index, meal);
            let meal_goal = goal.and_then(|g| g.targets.for_meal(meal));
            MealSummary {
                meal_type: meal,
                entry_count: day_entries.iter().filter(|e| e.meal_type == meal).count(),
                totals,
                goal: meal_goal,
                progress: meal_goal
                    .map(|t| progress_against(&totals, Some(&t), thresholds))
                    .unwrap_or_default(),
            }
        })
        .collect();

    let totals: NutritionTotals = meals.iter().map(|m| m.totals).sum();
    let daily_targets = goal.map(|g| g.targets.daily());

    DaySummary {
        date,
        totals,
        progress: progress_against(&totals, daily_targets.as_ref(), thresholds),
        goal_calories_from_macros: daily_targets
            .and_then(|t| calories_from_macros(t.protein, t.carbs, t.fat)),
        goal: goal.cloned(),
        meals,
    }
}
