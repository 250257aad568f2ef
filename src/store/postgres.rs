use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{resolve_write, Store};
use crate::date::LocalDate;
use crate::entries::repo_types::{Entry, EntryFields, EntryRejection, EntryRow};
use crate::foods::repo_types::{scales_in_range, Food, FoodFields, FoodOrder, RescaleRejection};
use crate::goals::repo_types::{Goal, GoalRow, GoalWrite};

const FOOD_COLUMNS: &str = "id, user_id, name, brand, description, image, serving_size, serving_unit, \
     calories, protein, fat, carbs, sugar, fiber, touched_at, created_at, updated_at";

const ENTRY_COLUMNS: &str =
    "id, user_id, food_id, quantity, entry_date, meal_type, note, created_at, updated_at";

const GOAL_COLUMNS: &str = "id, user_id, starts_on, targets, created_at, updated_at";

/// Postgres-backed store. Composite writes run in a single transaction.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_entries(rows: Vec<EntryRow>) -> anyhow::Result<Vec<Entry>> {
    rows.into_iter().map(Entry::try_from).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn insert_food(&self, user_id: Uuid, f: &FoodFields) -> anyhow::Result<Food> {
        let food = sqlx::query_as::<_, Food>(&format!(
            r#"
            INSERT INTO foods (id, user_id, name, brand, description, image, serving_size,
                               serving_unit, calories, protein, fat, carbs, sugar, fiber)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {FOOD_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&f.name)
        .bind(&f.brand)
        .bind(&f.description)
        .bind(&f.image)
        .bind(f.serving_size)
        .bind(&f.serving_unit)
        .bind(f.calories)
        .bind(f.protein)
        .bind(f.fat)
        .bind(f.carbs)
        .bind(f.sugar)
        .bind(f.fiber)
        .fetch_one(&self.db)
        .await
        .context("insert food")?;
        Ok(food)
    }

    async fn get_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Option<Food>> {
        let food = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1 AND user_id = $2"
        ))
        .bind(food_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("get food")?;
        Ok(food)
    }

    async fn list_foods(&self, user_id: Uuid, order: FoodOrder) -> anyhow::Result<Vec<Food>> {
        let order_by = match order {
            FoodOrder::Name => "name ASC, id ASC",
            FoodOrder::Recent => "touched_at DESC, name ASC",
        };
        let foods = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE user_id = $1 ORDER BY {order_by}"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list foods")?;
        Ok(foods)
    }

    async fn foods_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<Vec<Food>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let foods = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE user_id = $1 AND id = ANY($2)"
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .context("foods by ids")?;
        Ok(foods)
    }

    async fn replace_food(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        f: &FoodFields,
    ) -> anyhow::Result<Option<(Food, Food)>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let before = sqlx::query_as::<_, Food>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(food_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock food")?;
        let Some(before) = before else {
            return Ok(None);
        };

        let after = sqlx::query_as::<_, Food>(&format!(
            r#"
            UPDATE foods
               SET name = $3, brand = $4, description = $5, image = $6, serving_size = $7,
                   serving_unit = $8, calories = $9, protein = $10, fat = $11, carbs = $12,
                   sugar = $13, fiber = $14, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {FOOD_COLUMNS}
            "#
        ))
        .bind(food_id)
        .bind(user_id)
        .bind(&f.name)
        .bind(&f.brand)
        .bind(&f.description)
        .bind(&f.image)
        .bind(f.serving_size)
        .bind(&f.serving_unit)
        .bind(f.calories)
        .bind(f.protein)
        .bind(f.fat)
        .bind(f.carbs)
        .bind(f.sugar)
        .bind(f.fiber)
        .fetch_one(&mut *tx)
        .await
        .context("update food")?;

        tx.commit().await.context("commit tx")?;
        Ok(Some((before, after)))
    }

    async fn insert_entry(
        &self,
        user_id: Uuid,
        fields: &EntryFields,
    ) -> anyhow::Result<Result<Entry, EntryRejection>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        // Locks the food row and records recent use.
        let touched = sqlx::query("UPDATE foods SET touched_at = now() WHERE id = $1 AND user_id = $2")
            .bind(fields.food_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .context("touch food")?
            .rows_affected();
        if touched == 0 {
            return Ok(Err(EntryRejection::FoodMissing));
        }

        let row = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            INSERT INTO entries (id, user_id, food_id, quantity, entry_date, meal_type, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(fields.food_id)
        .bind(fields.quantity)
        .bind(fields.entry_date)
        .bind(fields.meal_type.as_str())
        .bind(&fields.note)
        .fetch_one(&mut *tx)
        .await
        .context("insert entry")?;

        tx.commit().await.context("commit tx")?;
        Ok(Ok(row.try_into()?))
    }

    async fn replace_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        fields: &EntryFields,
    ) -> anyhow::Result<Result<Entry, EntryRejection>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let entry = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM entries WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock entry")?;
        if entry.is_none() {
            return Ok(Err(EntryRejection::EntryMissing));
        }

        let food = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM foods WHERE id = $1 AND user_id = $2 FOR SHARE",
        )
        .bind(fields.food_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("check food")?;
        if food.is_none() {
            return Ok(Err(EntryRejection::FoodMissing));
        }

        let row = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            UPDATE entries
               SET food_id = $3, quantity = $4, entry_date = $5, meal_type = $6, note = $7,
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(entry_id)
        .bind(user_id)
        .bind(fields.food_id)
        .bind(fields.quantity)
        .bind(fields.entry_date)
        .bind(fields.meal_type.as_str())
        .bind(&fields.note)
        .fetch_one(&mut *tx)
        .await
        .context("update entry")?;

        tx.commit().await.context("commit tx")?;
        Ok(Ok(row.try_into()?))
    }

    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool> {
        let deleted = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete entry")?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn entries_between(
        &self,
        user_id: Uuid,
        from: LocalDate,
        to: LocalDate,
    ) -> anyhow::Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
              FROM entries
             WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
             ORDER BY entry_date ASC, created_at ASC
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await
        .context("entries between dates")?;
        into_entries(rows)
    }

    async fn entries_for_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
              FROM entries
             WHERE user_id = $1 AND food_id = $2
             ORDER BY entry_date DESC, created_at ASC
            "#
        ))
        .bind(user_id)
        .bind(food_id)
        .fetch_all(&self.db)
        .await
        .context("entries for food")?;
        into_entries(rows)
    }

    async fn scale_entry_quantities(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        multiplier: f64,
    ) -> anyhow::Result<Result<u64, RescaleRejection>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let food = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM foods WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(food_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("lock food")?;
        if food.is_none() {
            return Ok(Err(RescaleRejection::FoodMissing));
        }

        let quantities = sqlx::query_scalar::<_, f64>(
            "SELECT quantity FROM entries WHERE user_id = $1 AND food_id = $2 FOR UPDATE",
        )
        .bind(user_id)
        .bind(food_id)
        .fetch_all(&mut *tx)
        .await
        .context("lock entries")?;
        if !quantities.iter().all(|q| scales_in_range(*q, multiplier)) {
            return Ok(Err(RescaleRejection::OutOfRange));
        }

        let scaled = sqlx::query(
            r#"
            UPDATE entries
               SET quantity = quantity * $3, updated_at = now()
             WHERE user_id = $1 AND food_id = $2
            "#,
        )
        .bind(user_id)
        .bind(food_id)
        .bind(multiplier)
        .execute(&mut *tx)
        .await
        .context("scale entry quantities")?
        .rows_affected();

        tx.commit().await.context("commit tx")?;
        Ok(Ok(scaled))
    }

    async fn goal_effective_on(&self, user_id: Uuid, date: LocalDate) -> anyhow::Result<Option<Goal>> {
        let row = sqlx::query_as::<_, GoalRow>(&format!(
            r#"
            SELECT {GOAL_COLUMNS}
              FROM goals
             WHERE user_id = $1 AND starts_on <= $2
             ORDER BY starts_on DESC
             LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.db)
        .await
        .context("goal effective on date")?;
        Ok(row.map(Goal::from))
    }

    async fn write_goal(
        &self,
        user_id: Uuid,
        starts_on: LocalDate,
        write: &GoalWrite,
    ) -> anyhow::Result<Option<Goal>> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let current = sqlx::query_as::<_, GoalRow>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 AND starts_on = $2 FOR UPDATE"
        ))
        .bind(user_id)
        .bind(starts_on)
        .fetch_optional(&mut *tx)
        .await
        .context("lock goal")?;

        let Some(targets) = resolve_write(current.as_ref().map(|r| &r.targets.0), write) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, GoalRow>(&format!(
            r#"
            INSERT INTO goals (id, user_id, starts_on, targets)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, starts_on)
            DO UPDATE SET targets = EXCLUDED.targets, updated_at = now()
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(starts_on)
        .bind(Json(targets))
        .fetch_one(&mut *tx)
        .await
        .context("upsert goal")?;

        tx.commit().await.context("commit tx")?;
        Ok(Some(row.into()))
    }

    async fn list_goals(&self, user_id: Uuid) -> anyhow::Result<Vec<Goal>> {
        let rows = sqlx::query_as::<_, GoalRow>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 ORDER BY starts_on ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list goals")?;
        Ok(rows.into_iter().map(Goal::from).collect())
    }
}
