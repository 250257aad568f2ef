use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{resolve_write, Store};
use crate::date::LocalDate;
use crate::entries::repo_types::{Entry, EntryFields, EntryRejection};
use crate::foods::repo_types::{scales_in_range, Food, FoodFields, FoodOrder, RescaleRejection};
use crate::goals::repo_types::{Goal, GoalWrite};

/// In-process store used by tests and `AppState::fake`. A single lock guards
/// all tables, so every call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    foods: HashMap<Uuid, Food>,
    entries: Vec<Entry>, // insertion order
    goals: Vec<Goal>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))
    }
}

impl Tables {
    fn owned_food(&self, user_id: Uuid, food_id: Uuid) -> Option<&Food> {
        self.foods.get(&food_id).filter(|f| f.user_id == user_id)
    }
}

fn apply_food_fields(food: &mut Food, fields: &FoodFields) {
    food.name = fields.name.clone();
    food.brand = fields.brand.clone();
    food.description = fields.description.clone();
    food.image = fields.image.clone();
    food.serving_size = fields.serving_size;
    food.serving_unit = fields.serving_unit.clone();
    food.calories = fields.calories;
    food.protein = fields.protein;
    food.fat = fields.fat;
    food.carbs = fields.carbs;
    food.sugar = fields.sugar;
    food.fiber = fields.fiber;
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_food(&self, user_id: Uuid, fields: &FoodFields) -> anyhow::Result<Food> {
        let now = OffsetDateTime::now_utc();
        let mut food = Food {
            id: Uuid::new_v4(),
            user_id,
            name: String::new(),
            brand: None,
            description: None,
            image: None,
            serving_size: 0.0,
            serving_unit: String::new(),
            calories: 0.0,
            protein: 0.0,
            fat: 0.0,
            carbs: 0.0,
            sugar: 0.0,
            fiber: None,
            touched_at: now,
            created_at: now,
            updated_at: now,
        };
        apply_food_fields(&mut food, fields);
        self.tables()?.foods.insert(food.id, food.clone());
        Ok(food)
    }

    async fn get_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Option<Food>> {
        Ok(self.tables()?.owned_food(user_id, food_id).cloned())
    }

    async fn list_foods(&self, user_id: Uuid, order: FoodOrder) -> anyhow::Result<Vec<Food>> {
        let mut foods: Vec<Food> = self
            .tables()?
            .foods
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        match order {
            FoodOrder::Name => foods.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
            FoodOrder::Recent => {
                foods.sort_by(|a, b| b.touched_at.cmp(&a.touched_at).then(a.name.cmp(&b.name)))
            }
        }
        Ok(foods)
    }

    async fn foods_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<Vec<Food>> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.owned_food(user_id, *id).cloned())
            .collect())
    }

    async fn replace_food(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        fields: &FoodFields,
    ) -> anyhow::Result<Option<(Food, Food)>> {
        let mut tables = self.tables()?;
        let Some(food) = tables.foods.get_mut(&food_id).filter(|f| f.user_id == user_id) else {
            return Ok(None);
        };
        let before = food.clone();
        apply_food_fields(food, fields);
        food.updated_at = OffsetDateTime::now_utc();
        Ok(Some((before, food.clone())))
    }

    async fn insert_entry(
        &self,
        user_id: Uuid,
        fields: &EntryFields,
    ) -> anyhow::Result<Result<Entry, EntryRejection>> {
        let mut tables = self.tables()?;
        let now = OffsetDateTime::now_utc();
        match tables.foods.get_mut(&fields.food_id) {
            Some(food) if food.user_id == user_id => food.touched_at = now,
            _ => return Ok(Err(EntryRejection::FoodMissing)),
        }
        let entry = Entry {
            id: Uuid::new_v4(),
            user_id,
            food_id: fields.food_id,
            quantity: fields.quantity,
            entry_date: fields.entry_date,
            meal_type: fields.meal_type,
            note: fields.note.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.entries.push(entry.clone());
        Ok(Ok(entry))
    }

    async fn replace_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        fields: &EntryFields,
    ) -> anyhow::Result<Result<Entry, EntryRejection>> {
        let mut tables = self.tables()?;
        if !tables.entries.iter().any(|e| e.id == entry_id && e.user_id == user_id) {
            return Ok(Err(EntryRejection::EntryMissing));
        }
        if tables.owned_food(user_id, fields.food_id).is_none() {
            return Ok(Err(EntryRejection::FoodMissing));
        }
        let Some(entry) = tables.entries.iter_mut().find(|e| e.id == entry_id) else {
            return Ok(Err(EntryRejection::EntryMissing));
        };
        entry.food_id = fields.food_id;
        entry.quantity = fields.quantity;
        entry.entry_date = fields.entry_date;
        entry.meal_type = fields.meal_type;
        entry.note = fields.note.clone();
        entry.updated_at = OffsetDateTime::now_utc();
        Ok(Ok(entry.clone()))
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool> {
        let mut tables = self.tables()?;
        let before = tables.entries.len();
        tables
            .entries
            .retain(|e| !(e.id == entry_id && e.user_id == user_id));
        Ok(tables.entries.len() != before)
    }

    async fn entries_between(
        &self,
        user_id: Uuid,
        from: LocalDate,
        to: LocalDate,
    ) -> anyhow::Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .tables()?
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && from <= e.entry_date && e.entry_date <= to)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.entry_date);
        Ok(entries)
    }

    async fn entries_for_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .tables()?
            .entries
            .iter()
            .filter(|e| e.user_id == user_id && e.food_id == food_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        Ok(entries)
    }

    async fn scale_entry_quantities(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        multiplier: f64,
    ) -> anyhow::Result<Result<u64, RescaleRejection>> {
        let mut tables = self.tables()?;
        if tables.owned_food(user_id, food_id).is_none() {
            return Ok(Err(RescaleRejection::FoodMissing));
        }
        let of_food = |e: &Entry| e.user_id == user_id && e.food_id == food_id;
        if !tables
            .entries
            .iter()
            .filter(|e| of_food(*e))
            .all(|e| scales_in_range(e.quantity, multiplier))
        {
            return Ok(Err(RescaleRejection::OutOfRange));
        }
        let now = OffsetDateTime::now_utc();
        let mut scaled = 0;
        for entry in tables.entries.iter_mut().filter(|e| of_food(&**e)) {
            entry.quantity *= multiplier;
            entry.updated_at = now;
            scaled += 1;
        }
        Ok(Ok(scaled))
    }

    async fn goal_effective_on(&self, user_id: Uuid, date: LocalDate) -> anyhow::Result<Option<Goal>> {
        Ok(self
            .tables()?
            .goals
            .iter()
            .filter(|g| g.user_id == user_id && g.starts_on <= date)
            .max_by_key(|g| g.starts_on)
            .cloned())
    }

    async fn write_goal(
        &self,
        user_id: Uuid,
        starts_on: LocalDate,
        write: &GoalWrite,
    ) -> anyhow::Result<Option<Goal>> {
        let mut tables = self.tables()?;
        let now = OffsetDateTime::now_utc();
        let existing = tables
            .goals
            .iter_mut()
            .find(|g| g.user_id == user_id && g.starts_on == starts_on);

        match existing {
            Some(goal) => {
                let Some(targets) = resolve_write(Some(&goal.targets), write) else {
                    return Ok(None);
                };
                goal.targets = targets;
                goal.updated_at = now;
                Ok(Some(goal.clone()))
            }
            None => {
                let Some(targets) = resolve_write(None, write) else {
                    return Ok(None);
                };
                let goal = Goal {
                    id: Uuid::new_v4(),
                    user_id,
                    starts_on,
                    targets,
                    created_at: now,
                    updated_at: now,
                };
                tables.goals.push(goal.clone());
                Ok(Some(goal))
            }
        }
    }

    async fn list_goals(&self, user_id: Uuid) -> anyhow::Result<Vec<Goal>> {
        let mut goals: Vec<Goal> = self
            .tables()?
            .goals
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        goals.sort_by_key(|g| g.starts_on);
        Ok(goals)
    }
}
