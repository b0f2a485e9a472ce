//! Progress labels shown next to each goal on the admin goals page.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::enums::GoalStatus;
use crate::models::PerformanceGoal;

/// Below this share of the pro-rated expectation a goal is `Behind`.
const AT_RISK_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressLabel {
    OnTrack,
    AtRisk,
    Behind,
    Completed,
    Missed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProgress {
    pub actual: f64,
    /// Value the goal should have reached by now if progress were linear.
    pub expected: f64,
    /// `actual / target` in percent, capped at 100.
    pub percent: f64,
    pub label: ProgressLabel,
}

pub fn derive_progress(
    goal: &PerformanceGoal,
    latest_actual: Option<f64>,
    today: NaiveDate,
) -> GoalProgress {
    let actual = latest_actual.unwrap_or(0.0);
    let target = if goal.target_value > 0.0 { goal.target_value } else { 1.0 };
    let period = goal.period();

    let total_days = period.num_days();
    let days_passed = if today < period.start {
        1
    } else if today > period.end {
        total_days
    } else {
        (today - period.start).num_days() + 1
    };
    let expected = (target * days_passed as f64 / total_days as f64).round();

    let label = match goal.status {
        GoalStatus::Missed => ProgressLabel::Missed,
        GoalStatus::Done => ProgressLabel::Completed,
        GoalStatus::Active if actual >= expected => ProgressLabel::OnTrack,
        GoalStatus::Active if actual >= expected * AT_RISK_RATIO => ProgressLabel::AtRisk,
        GoalStatus::Active => ProgressLabel::Behind,
    };

    GoalProgress {
        actual,
        expected,
        percent: (actual / target * 100.0).round().min(100.0),
        label,
    }
}
