use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{GoalMetric, GoalStatus, PeriodType};
use super::filters::DateRange;
use crate::period;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceGoal {
    pub id: i64,
    pub period_type: PeriodType,
    pub period_start: NaiveDate,
    pub period_end: Option<NaiveDate>,
    /// Raw metric name. Goals created by other tools may carry metrics this
    /// crate does not compute; see [`PerformanceGoal::metric_kind`].
    pub metric: String,
    pub target_value: f64,
    pub status: GoalStatus,
    pub service_id: Option<i64>,
    pub package_promo_id: Option<i64>,
    pub created_by: Option<i64>,
}

impl PerformanceGoal {
    pub fn metric_kind(&self) -> Option<GoalMetric> {
        self.metric.parse().ok()
    }

    /// Calendar span the goal is measured over.
    ///
    /// Month goals cover the month of `period_start`. Promo goals run to
    /// `period_end`, or are a single day when no end was recorded.
    pub fn period(&self) -> DateRange {
        match self.period_type {
            PeriodType::Month => DateRange::month_of(self.period_start),
            PeriodType::Promo => {
                let end = self
                    .period_end
                    .filter(|end| *end >= self.period_start)
                    .unwrap_or(self.period_start);
                DateRange {
                    start: self.period_start,
                    end,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGoal {
    pub period_type: PeriodType,
    pub period_start: NaiveDate,
    pub period_end: Option<NaiveDate>,
    pub metric: GoalMetric,
    pub target_value: f64,
    pub status: GoalStatus,
    pub service_id: Option<i64>,
    pub package_promo_id: Option<i64>,
    pub created_by: Option<i64>,
}

impl NewGoal {
    /// An active goal for the month containing `month`.
    pub fn monthly(month: NaiveDate, metric: GoalMetric, target_value: f64) -> Self {
        Self {
            period_type: PeriodType::Month,
            period_start: period::first_of_month(month),
            period_end: None,
            metric,
            target_value,
            status: GoalStatus::Active,
            service_id: None,
            package_promo_id: None,
            created_by: None,
        }
    }

    pub fn created_by(mut self, user_id: i64) -> Self {
        self.created_by = Some(user_id);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalProgressSnapshot {
    pub id: i64,
    pub goal_id: i64,
    pub as_of_date: NaiveDate,
    pub actual_value: f64,
}
