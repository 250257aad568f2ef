use std::collections::BTreeMap;

use time::{format_description::FormatItem, macros::format_description};

use super::totals::{index_foods, NutritionTotals};
use super::Nutrient;
use crate::date::LocalDate;
use crate::entries::repo_types::{Entry, MealType};
use crate::foods::repo_types::Food;

const LONG_DATE: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const HEADING_DATE: &[FormatItem<'static>] =
    format_description!("[weekday], [month repr:long] [day padding:none], [year]");

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub meals: Vec<MealType>,
    pub nutrients: Vec<Nutrient>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            meals: MealType::ALL.to_vec(),
            nutrients: Nutrient::ALL.to_vec(),
        }
    }
}

/// Renders entries as a Markdown food log grouped by day and meal.
///
/// Amounts and macros are rounded per line and per total from full-precision
/// values. Entries whose food no longer exists are left out.
pub fn render_markdown(entries: &[Entry], foods: &[Food], options: &ExportOptions) -> String {
    let mut by_date: BTreeMap<LocalDate, Vec<&Entry>> = BTreeMap::new();
    for entry in entries.iter().filter(|e| options.meals.contains(&e.meal_type)) {
        by_date.entry(entry.entry_date).or_default().push(entry);
    }

    let (Some(first), Some(last)) = (by_date.keys().next(), by_date.keys().next_back()) else {
        return "# Food Export\n\nNo entries found for the selected criteria.".to_string();
    };

    let index = index_foods(foods);
    let mut md = String::from("# Food Export\n\n");
    if first == last {
        md.push_str(&format!("**Date:** {}\n\n", format_date(*first, LONG_DATE)));
    } else {
        md.push_str(&format!(
            "**Date Range:** {} - {}\n\n",
            format_date(*first, LONG_DATE),
            format_date(*last, LONG_DATE)
        ));
    }
    let meal_labels: Vec<&str> = options.meals.iter().map(|m| m.label()).collect();
    md.push_str(&format!("**Meals:** {}\n\n", meal_labels.join(", ")));
    let nutrient_labels: Vec<&str> = options.nutrients.iter().map(|n| n.label()).collect();
    md.push_str(&format!("**Nutritional Information:** {}\n\n", nutrient_labels.join(", ")));
    md.push_str("---\n\n");

    for (date, day_entries) in &by_date {
        md.push_str(&format!("## {}\n\n", format_date(*date, HEADING_DATE)));
        let mut day_totals = NutritionTotals::default();

        for meal in MealType::ALL {
            let meal_entries: Vec<&&Entry> =
                day_entries.iter().filter(|e| e.meal_type == meal).collect();
            if meal_entries.is_empty() {
                continue;
            }
            md.push_str(&format!("### {}\n\n", meal.label()));

            let mut meal_totals = NutritionTotals::default();
            for entry in meal_entries {
                let Some(food) = index.get(&entry.food_id) else {
                    continue;
                };
                let line = NutritionTotals::of_servings(food, entry.quantity);
                meal_totals += line;

                let amount = (entry.quantity * food.serving_size).round();
                md.push_str(&format!("- **{}** - {}{}", food.name, amount, food.serving_unit));
                if !options.nutrients.is_empty() {
                    md.push_str(&format!(" ({})", nutrient_parts(&line, &options.nutrients)));
                }
                if let Some(note) = entry.note.as_deref() {
                    md.push_str(&format!("\n  - Note: {note}"));
                }
                md.push('\n');
            }
            day_totals += meal_totals;

            if options.nutrients.is_empty() {
                md.push('\n');
            } else {
                md.push_str(&format!(
                    "\n**Totals:** {}\n\n",
                    nutrient_parts(&meal_totals, &options.nutrients)
                ));
            }
        }

        if !options.nutrients.is_empty() {
            md.push_str(&format!(
                "**Daily Totals:** {}\n\n",
                nutrient_parts(&day_totals, &options.nutrients)
            ));
        }
        md.push_str("---\n\n");
    }

    md.trim().to_string()
}

fn nutrient_parts(totals: &NutritionTotals, nutrients: &[Nutrient]) -> String {
    nutrients
        .iter()
        .map(|n| format!("{}{} {}", totals.get(*n).round(), n.unit(), n.label()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_date(date: LocalDate, format: &[FormatItem<'_>]) -> String {
    date.date()
        .format(format)
        .unwrap_or_else(|_| date.to_string())
}
