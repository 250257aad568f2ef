use serde::{Deserialize, Serialize};

use super::repo_types::{Goal, MacroTargets};
use crate::date::LocalDate;

#[derive(Debug, Deserialize)]
pub struct EffectiveGoalQuery {
    pub date: LocalDate,
}

/// The version in effect on `date`, if any, with its whole-day targets.
#[derive(Debug, Serialize)]
pub struct EffectiveGoalResponse {
    pub date: LocalDate,
    pub goal: Option<Goal>,
    pub daily: Option<MacroTargets>,
}
