use serde::{Deserialize, Serialize};

/// Consumed amount as a percentage of the goal.
///
/// `None` when there is no goal or the goal is zero. The value is not clamped;
/// clamping to a chart range is left to the presentation layer.
pub fn percent_of_goal(consumed: f64, goal: Option<f64>) -> Option<f64> {
    match goal {
        Some(g) if g > 0.0 => Some(consumed / g * 100.0),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Under,
    OnTarget,
    SlightlyOver,
    Over,
}

/// Percentage boundaries between progress classes.
///
/// Below `on_target_min_pct` is under. Up to and including `on_target_max_pct`
/// is on target, up to and including `slightly_over_max_pct` is slightly over,
/// and anything above is over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressThresholds {
    pub on_target_min_pct: f64,
    pub on_target_max_pct: f64,
    pub slightly_over_max_pct: f64,
}

impl Default for ProgressThresholds {
    fn default() -> Self {
        Self {
            on_target_min_pct: 90.0,
            on_target_max_pct: 110.0,
            slightly_over_max_pct: 120.0,
        }
    }
}

impl ProgressThresholds {
    pub fn validate(&self) -> anyhow::Result<()> {
        let ordered = self.on_target_min_pct.is_finite()
            && self.slightly_over_max_pct.is_finite()
            && 0.0 <= self.on_target_min_pct
            && self.on_target_min_pct < self.on_target_max_pct
            && self.on_target_max_pct < self.slightly_over_max_pct;
        anyhow::ensure!(
            ordered,
            "progress thresholds must be increasing: {} < {} < {}",
            self.on_target_min_pct,
            self.on_target_max_pct,
            self.slightly_over_max_pct
        );
        Ok(())
    }

    pub fn classify(&self, percent: f64) -> ProgressStatus {
        if percent < self.on_target_min_pct {
            ProgressStatus::Under
        } else if percent <= self.on_target_max_pct {
            ProgressStatus::OnTarget
        } else if percent <= self.slightly_over_max_pct {
            ProgressStatus::SlightlyOver
        } else {
            ProgressStatus::Over
        }
    }
}

/// Calories implied by macro grams (4/4/9 kcal per gram).
///
/// Only `None` when all three are absent; missing macros count as zero, so
/// callers should label a partial result as approximate.
pub fn calories_from_macros(protein: Option<f64>, carbs: Option<f64>, fat: Option<f64>) -> Option<f64> {
    if protein.is_none() && carbs.is_none() && fat.is_none() {
        return None;
    }
    Some(protein.unwrap_or(0.0) * 4.0 + carbs.unwrap_or(0.0) * 4.0 + fat.unwrap_or(0.0) * 9.0)
}
