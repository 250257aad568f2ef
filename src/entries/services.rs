use std::collections::HashSet;
use std::str::FromStr;

use tracing::info;
use uuid::Uuid;

use super::dto::{DayEntry, DayMeal, DayView, EntryInput, DELETED_FOOD_LABEL};
use super::repo_types::{Entry, EntryFields, EntryRejection, MealType};
use crate::date::LocalDate;
use crate::error::{CoreError, CoreResult};
use crate::foods::repo_types::Food;
use crate::goals;
use crate::nutrition::export::{render_markdown, ExportOptions};
use crate::nutrition::progress::ProgressThresholds;
use crate::nutrition::summary::{summarize_day, DaySummary};
use crate::nutrition::totals::{index_foods, NutritionTotals};
use crate::nutrition::Nutrient;
use crate::store::Store;
use crate::validate::{non_blank, positive};

pub fn validate_entry(input: EntryInput) -> CoreResult<EntryFields> {
    Ok(EntryFields {
        food_id: input.food_id,
        quantity: positive("quantity", input.quantity)?,
        entry_date: input.entry_date,
        meal_type: input.meal_type,
        note: non_blank(input.note),
    })
}

fn rejected(rejection: EntryRejection, entry_id: Option<Uuid>, food_id: Uuid) -> CoreError {
    match (rejection, entry_id) {
        (EntryRejection::EntryMissing, Some(id)) => CoreError::not_found("entry", id),
        _ => CoreError::not_found("food", food_id),
    }
}

pub async fn create_entry(store: &dyn Store, user_id: Uuid, input: EntryInput) -> CoreResult<Entry> {
    let fields = validate_entry(input)?;
    let entry = store
        .insert_entry(user_id, &fields)
        .await?
        .map_err(|r| rejected(r, None, fields.food_id))?;
    info!(%user_id, entry_id = %entry.id, food_id = %entry.food_id, "entry created");
    Ok(entry)
}

/// Full replace. Both the entry and the (possibly new) food must be the caller's.
pub async fn update_entry(
    store: &dyn Store,
    user_id: Uuid,
    entry_id: Uuid,
    input: EntryInput,
) -> CoreResult<Entry> {
    let fields = validate_entry(input)?;
    let entry = store
        .replace_entry(user_id, entry_id, &fields)
        .await?
        .map_err(|r| rejected(r, Some(entry_id), fields.food_id))?;
    info!(%user_id, %entry_id, "entry updated");
    Ok(entry)
}

pub async fn remove_entry(store: &dyn Store, user_id: Uuid, entry_id: Uuid) -> CoreResult<()> {
    if !store.delete_entry(user_id, entry_id).await? {
        return Err(CoreError::not_found("entry", entry_id));
    }
    info!(%user_id, %entry_id, "entry removed");
    Ok(())
}

pub async fn entries_on(store: &dyn Store, user_id: Uuid, date: LocalDate) -> CoreResult<Vec<Entry>> {
    Ok(store.entries_between(user_id, date, date).await?)
}

pub async fn entries_between(
    store: &dyn Store,
    user_id: Uuid,
    from: LocalDate,
    to: LocalDate,
) -> CoreResult<Vec<Entry>> {
    if from > to {
        return Err(CoreError::invalid(format!("from ({from}) is after to ({to})")));
    }
    Ok(store.entries_between(user_id, from, to).await?)
}

pub async fn entries_for_food(store: &dyn Store, user_id: Uuid, food_id: Uuid) -> CoreResult<Vec<Entry>> {
    Ok(store.entries_for_food(user_id, food_id).await?)
}

/// The caller's foods referenced by `entries`. Deleted foods are simply absent.
pub async fn foods_for(store: &dyn Store, user_id: Uuid, entries: &[Entry]) -> CoreResult<Vec<Food>> {
    let mut seen = HashSet::new();
    let ids: Vec<Uuid> = entries
        .iter()
        .map(|e| e.food_id)
        .filter(|id| seen.insert(*id))
        .collect();
    Ok(store.foods_by_ids(user_id, &ids).await?)
}

pub async fn day_view(store: &dyn Store, user_id: Uuid, date: LocalDate) -> CoreResult<DayView> {
    let entries = entries_on(store, user_id, date).await?;
    let foods = foods_for(store, user_id, &entries).await?;
    Ok(build_day_view(date, &entries, &foods))
}

/// Pairs each entry of `date` with its food, grouped by meal in display order.
pub fn build_day_view(date: LocalDate, entries: &[Entry], foods: &[Food]) -> DayView {
    let index = index_foods(foods);
    let meals = MealType::ALL
        .into_iter()
        .map(|meal| DayMeal {
            meal_type: meal,
            entries: entries
                .iter()
                .filter(|e| e.entry_date == date && e.meal_type == meal)
                .map(|e| {
                    let food = index.get(&e.food_id).copied();
                    DayEntry {
                        entry: e.clone(),
                        food_label: food.map_or_else(|| DELETED_FOOD_LABEL.to_string(), |f| f.name.clone()),
                        totals: food
                            .map(|f| NutritionTotals::of_servings(f, e.quantity))
                            .unwrap_or_default(),
                        food: food.cloned(),
                    }
                })
                .collect(),
        })
        .collect();
    DayView { date, meals }
}

pub async fn day_summary(
    store: &dyn Store,
    user_id: Uuid,
    date: LocalDate,
    thresholds: &ProgressThresholds,
) -> CoreResult<DaySummary> {
    let entries = entries_on(store, user_id, date).await?;
    let foods = foods_for(store, user_id, &entries).await?;
    let goal = goals::services::resolve(store, user_id, date).await?;
    Ok(summarize_day(date, &entries, &foods, goal.as_ref(), thresholds))
}

/// Comma-separated list; blank or absent selects every value.
pub fn parse_selection<T>(raw: Option<&str>, all: &[T]) -> CoreResult<Vec<T>>
where
    T: FromStr<Err = CoreError> + PartialEq + Copy,
{
    let mut picked = Vec::new();
    for part in raw.unwrap_or_default().split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let value = part.parse::<T>()?;
        if !picked.contains(&value) {
            picked.push(value);
        }
    }
    if picked.is_empty() {
        return Ok(all.to_vec());
    }
    // keep canonical display order
    Ok(all.iter().copied().filter(|v| picked.contains(v)).collect())
}

pub async fn export_markdown(
    store: &dyn Store,
    user_id: Uuid,
    from: LocalDate,
    to: LocalDate,
    meals: Option<&str>,
    nutrients: Option<&str>,
) -> CoreResult<String> {
    let options = ExportOptions {
        meals: parse_selection(meals, &MealType::ALL)?,
        nutrients: parse_selection(nutrients, &Nutrient::ALL)?,
    };
    let entries = entries_between(store, user_id, from, to).await?;
    let foods = foods_for(store, user_id, &entries).await?;
    info!(%user_id, %from, %to, entries = entries.len(), "export rendered");
    Ok(render_markdown(&entries, &foods, &options))
}
