//! Persistence port. Every operation is scoped to the owning user; a row that
//! belongs to someone else is reported exactly like a missing row.

use async_trait::async_trait;
use uuid::Uuid;

use crate::date::LocalDate;
use crate::entries::repo_types::{Entry, EntryFields, EntryRejection};
use crate::foods::repo_types::{Food, FoodFields, FoodOrder, RescaleRejection};
use crate::goals::repo_types::{Goal, GoalTargets, GoalWrite};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    // ---- foods ----
    async fn insert_food(&self, user_id: Uuid, fields: &FoodFields) -> anyhow::Result<Food>;
    async fn get_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Option<Food>>;
    async fn list_foods(&self, user_id: Uuid, order: FoodOrder) -> anyhow::Result<Vec<Food>>;
    async fn foods_by_ids(&self, user_id: Uuid, ids: &[Uuid]) -> anyhow::Result<Vec<Food>>;
    /// Replaces the mutable fields; returns the food as it was before the write.
    async fn replace_food(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        fields: &FoodFields,
    ) -> anyhow::Result<Option<(Food, Food)>>;

    // ---- entries ----
    /// Inserts the entry only if the food belongs to the user, and marks the
    /// food as recently used, in one transaction.
    async fn insert_entry(
        &self,
        user_id: Uuid,
        fields: &EntryFields,
    ) -> anyhow::Result<Result<Entry, EntryRejection>>;
    async fn replace_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        fields: &EntryFields,
    ) -> anyhow::Result<Result<Entry, EntryRejection>>;
    async fn delete_entry(&self, user_id: Uuid, entry_id: Uuid) -> anyhow::Result<bool>;
    /// Entries with `from <= entry_date <= to`, ordered by date then creation.
    async fn entries_between(
        &self,
        user_id: Uuid,
        from: LocalDate,
        to: LocalDate,
    ) -> anyhow::Result<Vec<Entry>>;
    async fn entries_for_food(&self, user_id: Uuid, food_id: Uuid) -> anyhow::Result<Vec<Entry>>;
    /// Multiplies the quantity of every entry of the food by `multiplier`,
    /// all or nothing. Nothing is written when the food is not the user's or
    /// when any scaled quantity would leave the valid range.
    async fn scale_entry_quantities(
        &self,
        user_id: Uuid,
        food_id: Uuid,
        multiplier: f64,
    ) -> anyhow::Result<Result<u64, RescaleRejection>>;

    // ---- goals ----
    /// The version with the greatest `starts_on <= date`.
    async fn goal_effective_on(&self, user_id: Uuid, date: LocalDate) -> anyhow::Result<Option<Goal>>;
    /// Writes the single version starting on `starts_on`, creating it when
    /// absent, in one transaction. `None` when a patch does not match the
    /// shape of the stored version.
    async fn write_goal(
        &self,
        user_id: Uuid,
        starts_on: LocalDate,
        write: &GoalWrite,
    ) -> anyhow::Result<Option<Goal>>;
    async fn list_goals(&self, user_id: Uuid) -> anyhow::Result<Vec<Goal>>;
}

/// Targets produced by applying `write` to the version currently stored at
/// the date, if any. `None` on a patch shape mismatch.
pub(crate) fn resolve_write(current: Option<&GoalTargets>, write: &GoalWrite) -> Option<GoalTargets> {
    match (write, current) {
        (GoalWrite::Replace(targets), _) => Some(*targets),
        (GoalWrite::Patch(patch), Some(current)) => patch.apply(current),
        (GoalWrite::Patch(patch), None) => patch.apply(&patch.empty_targets()),
    }
}
