use tracing::{info, warn};
use uuid::Uuid;

use super::repo_types::{Goal, GoalTargets, GoalTargetsPatch, GoalWrite, MacroTargetsPatch};
use crate::date::LocalDate;
use crate::error::{CoreError, CoreResult};
use crate::store::Store;
use crate::validate::non_negative;

const FIELDS: [&str; 5] = ["calories", "protein", "fat", "carbs", "fiber"];

pub fn validate_targets(targets: &GoalTargets) -> CoreResult<()> {
    for t in targets.all_targets() {
        for (field, value) in t.values() {
            if let Some(v) = value {
                non_negative(field, v)?;
            }
        }
    }
    Ok(())
}

fn validate_patch(patch: &GoalTargetsPatch) -> CoreResult<()> {
    let parts: Vec<&MacroTargetsPatch> = match patch {
        GoalTargetsPatch::Daily(p) => vec![p],
        GoalTargetsPatch::PerMeal {
            breakfast,
            lunch,
            dinner,
        } => vec![breakfast, lunch, dinner],
    };
    for p in parts {
        for (field, value) in FIELDS.iter().zip(p.set_values()) {
            if let Some(v) = value {
                non_negative(field, v)?;
            }
        }
    }
    Ok(())
}

/// The goal in effect on `date`: the version with the greatest
/// `starts_on <= date`.
pub async fn resolve(store: &dyn Store, user_id: Uuid, date: LocalDate) -> CoreResult<Option<Goal>> {
    Ok(store.goal_effective_on(user_id, date).await?)
}

/// Writes the version starting on `starts_on`. Other versions are never touched.
pub async fn upsert(
    store: &dyn Store,
    user_id: Uuid,
    starts_on: LocalDate,
    write: GoalWrite,
) -> CoreResult<Goal> {
    match &write {
        GoalWrite::Replace(targets) => validate_targets(targets)?,
        GoalWrite::Patch(patch) => validate_patch(patch)?,
    }

    let Some(goal) = store.write_goal(user_id, starts_on, &write).await? else {
        warn!(%user_id, %starts_on, "goal patch does not match stored goal kind");
        return Err(CoreError::invalid(
            "patch kind does not match the goal stored for this date",
        ));
    };
    info!(%user_id, %starts_on, goal_id = %goal.id, "goal written");
    Ok(goal)
}

pub async fn history(store: &dyn Store, user_id: Uuid) -> CoreResult<Vec<Goal>> {
    Ok(store.list_goals(user_id).await?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::goals::repo_types::{FieldPatch, MacroTargets};
    use crate::store::MemoryStore;

    fn day(s: &str) -> LocalDate {
        s.parse().unwrap()
    }

    fn daily(calories: f64) -> GoalWrite {
        GoalWrite::Replace(GoalTargets::Daily(MacroTargets {
            calories: Some(calories),
            protein: Some(150.0),
            ..Default::default()
        }))
    }

    fn patch(calories: FieldPatch<f64>, protein: FieldPatch<f64>) -> MacroTargetsPatch {
        MacroTargetsPatch {
            calories,
            protein,
            fat: FieldPatch::Leave,
            carbs: FieldPatch::Leave,
            fiber: FieldPatch::Leave,
        }
    }

    fn calories(goal: &Option<Goal>) -> Option<f64> {
        goal.as_ref().and_then(|g| g.targets.daily().calories)
    }

    #[tokio::test]
    async fn resolve_picks_latest_version_not_after_date() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        upsert(&store, user_id, day("2024-01-01"), daily(2000.0)).await.unwrap();
        upsert(&store, user_id, day("2024-02-01"), daily(1800.0)).await.unwrap();

        assert_eq!(resolve(&store, user_id, day("2023-12-31")).await.unwrap(), None);
        assert_eq!(calories(&resolve(&store, user_id, day("2024-01-01")).await.unwrap()), Some(2000.0));
        assert_eq!(calories(&resolve(&store, user_id, day("2024-01-31")).await.unwrap()), Some(2000.0));
        assert_eq!(calories(&resolve(&store, user_id, day("2024-02-01")).await.unwrap()), Some(1800.0));
        assert_eq!(calories(&resolve(&store, user_id, day("2030-06-15")).await.unwrap()), Some(1800.0));
        assert_eq!(resolve(&store, Uuid::new_v4(), day("2024-02-01")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_touches_only_the_exact_date() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        upsert(&store, user_id, day("2024-01-01"), daily(2000.0)).await.unwrap();
        upsert(&store, user_id, day("2024-02-01"), daily(1800.0)).await.unwrap();

        let edit = GoalWrite::Patch(GoalTargetsPatch::Daily(patch(
            FieldPatch::Set(2100.0),
            FieldPatch::Leave,
        )));
        upsert(&store, user_id, day("2024-01-01"), edit).await.unwrap();

        let versions = history(&store, user_id).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].targets.daily().calories, Some(2100.0));
        assert_eq!(versions[0].targets.daily().protein, Some(150.0));
        assert_eq!(versions[1].targets.daily().calories, Some(1800.0));
    }

    #[tokio::test]
    async fn patch_can_unset_a_target() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        upsert(&store, user_id, day("2024-01-01"), daily(2000.0)).await.unwrap();

        let edit = GoalWrite::Patch(GoalTargetsPatch::Daily(patch(
            FieldPatch::Leave,
            FieldPatch::Unset,
        )));
        let goal = upsert(&store, user_id, day("2024-01-01"), edit).await.unwrap();
        assert_eq!(goal.targets.daily().calories, Some(2000.0));
        assert_eq!(goal.targets.daily().protein, None);
    }

    #[tokio::test]
    async fn patch_on_new_date_starts_from_empty_targets() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let edit = GoalWrite::Patch(GoalTargetsPatch::Daily(patch(
            FieldPatch::Set(1900.0),
            FieldPatch::Leave,
        )));
        let goal = upsert(&store, user_id, day("2024-05-01"), edit).await.unwrap();
        assert_eq!(goal.targets.daily().calories, Some(1900.0));
        assert_eq!(goal.targets.daily().protein, None);
    }

    #[tokio::test]
    async fn patch_of_other_kind_is_rejected() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        upsert(&store, user_id, day("2024-01-01"), daily(2000.0)).await.unwrap();

        let leave = patch(FieldPatch::Leave, FieldPatch::Leave);
        let edit = GoalWrite::Patch(GoalTargetsPatch::PerMeal {
            breakfast: leave,
            lunch: leave,
            dinner: leave,
        });
        assert_matches!(
            upsert(&store, user_id, day("2024-01-01"), edit).await,
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[tokio::test]
    async fn negative_or_non_finite_targets_are_rejected() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        assert_matches!(
            upsert(&store, user_id, day("2024-01-01"), daily(-5.0)).await,
            Err(CoreError::InvalidArgument(_))
        );
        let edit = GoalWrite::Patch(GoalTargetsPatch::Daily(patch(
            FieldPatch::Set(f64::INFINITY),
            FieldPatch::Leave,
        )));
        assert_matches!(
            upsert(&store, user_id, day("2024-01-01"), edit).await,
            Err(CoreError::InvalidArgument(_))
        );
        assert!(history(&store, user_id).await.unwrap().is_empty());
    }
}
