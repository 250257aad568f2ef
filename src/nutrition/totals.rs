use std::collections::HashMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::Serialize;
use uuid::Uuid;

use super::Nutrient;
use crate::entries::repo_types::{Entry, MealType};
use crate::foods::repo_types::Food;

/// Summed nutrition. Values stay in full precision; round only for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub sugar: f64,
    pub fiber: f64,
}

impl NutritionTotals {
    /// Contribution of `quantity` servings of `food`.
    pub fn of_servings(food: &Food, quantity: f64) -> Self {
        Self {
            calories: food.per_serving(Nutrient::Calories) * quantity,
            protein: food.per_serving(Nutrient::Protein) * quantity,
            fat: food.per_serving(Nutrient::Fat) * quantity,
            carbs: food.per_serving(Nutrient::Carbs) * quantity,
            sugar: food.per_serving(Nutrient::Sugar) * quantity,
            fiber: food.per_serving(Nutrient::Fiber) * quantity,
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Fat => self.fat,
            Nutrient::Carbs => self.carbs,
            Nutrient::Sugar => self.sugar,
            Nutrient::Fiber => self.fiber,
        }
    }

    /// Nearest whole calorie / gram.
    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: self.protein.round(),
            fat: self.fat.round(),
            carbs: self.carbs.round(),
            sugar: self.sugar.round(),
            fiber: self.fiber.round(),
        }
    }
}

impl Add for NutritionTotals {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for NutritionTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.protein += rhs.protein;
        self.fat += rhs.fat;
        self.carbs += rhs.carbs;
        self.sugar += rhs.sugar;
        self.fiber += rhs.fiber;
    }
}

impl Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, t| acc + t)
    }
}

pub type FoodIndex<'a> = HashMap<Uuid, &'a Food>;

pub fn index_foods(foods: &[Food]) -> FoodIndex<'_> {
    foods.iter().map(|f| (f.id, f)).collect()
}

/// Totals for one meal. Entries whose food is missing contribute nothing.
pub fn totals_for_meal(entries: &[Entry], foods: &[Food], meal: MealType) -> NutritionTotals {
    meal_totals(entries, &index_foods(foods), meal)
}

/// Totals for the whole day, defined as the sum of the per-meal totals in
/// `MealType::ALL` order so the two views agree exactly.
pub fn totals_for_day(entries: &[Entry], foods: &[Food]) -> NutritionTotals {
    let index = index_foods(foods);
    MealType::ALL
        .into_iter()
        .map(|meal| meal_totals(entries, &index, meal))
        .sum()
}

pub(crate) fn meal_totals(entries: &[Entry], index: &FoodIndex<'_>, meal: MealType) -> NutritionTotals {
    entries
        .iter()
        .filter(|e| e.meal_type == meal)
        .filter_map(|e| index.get(&e.food_id).map(|food| NutritionTotals::of_servings(food, e.quantity)))
        .sum()
}
