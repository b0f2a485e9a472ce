//! Performance goals: creation from admin requests, progress evaluation,
//! snapshots and status settlement.

pub mod evaluator;
pub mod progress;

pub use evaluator::*;
pub use progress::*;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SeedConfig;
use crate::db::repository::{
    find_administrator, get_goal, get_service, insert_goal, is_package_promo, latest_snapshot,
    list_goals_overlapping,
};
use crate::db::DatabaseError;
use crate::models::enums::{GoalMetric, GoalStatus, PeriodType, UserRole};
use crate::models::{DateRange, NewGoal, PerformanceGoal, User, DATE_FORMAT};
use crate::period;

#[derive(Error, Debug)]
pub enum GoalError {
    #[error("Invalid goal period: {0}")]
    InvalidPeriod(String),

    #[error("Unknown goal metric: {0}")]
    UnknownMetric(String),

    #[error("Target value must be a positive number, got {0}")]
    InvalidTarget(f64),

    #[error("Metric requires {0}")]
    MissingTarget(&'static str),

    #[error("Service {0} does not exist")]
    UnknownService(i64),

    #[error("Service {0} is not a package or promo")]
    NotAPackage(i64),

    #[error("User {0} is not an administrator")]
    NotAuthorized(i64),

    #[error("No administrator account found to own the goal")]
    NoAdministrator,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Goal creation payload as sent by the admin goals page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalRequest {
    pub period_type: String,
    /// `YYYY-MM-DD`; month goals also accept `YYYY-MM`.
    pub period_start: String,
    #[serde(default)]
    pub period_end: Option<String>,
    pub metric: String,
    pub target_value: f64,
    #[serde(default)]
    pub service_id: Option<i64>,
    #[serde(default)]
    pub package_promo_id: Option<i64>,
}

/// A goal with its most recent measured value and derived progress.
#[derive(Debug, Clone, Serialize)]
pub struct GoalOverview {
    pub goal: PerformanceGoal,
    pub latest_actual: Option<f64>,
    pub progress: GoalProgress,
}

fn parse_date(value: &str) -> Result<NaiveDate, GoalError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| GoalError::InvalidPeriod(format!("'{value}' is not a YYYY-MM-DD date")))
}

/// The administrator that goals created outside a session are attributed to.
pub fn goal_owner(conn: &Connection) -> Result<User, GoalError> {
    find_administrator(conn)?.ok_or(GoalError::NoAdministrator)
}

/// Validates `request` and stores it as a goal owned by `admin`.
pub fn create_goal(
    conn: &Connection,
    admin: &User,
    request: &GoalRequest,
) -> Result<PerformanceGoal, GoalError> {
    if admin.role != UserRole::Admin {
        return Err(GoalError::NotAuthorized(admin.id));
    }

    let period_type: PeriodType = request
        .period_type
        .parse()
        .map_err(|_| GoalError::InvalidPeriod(format!("unknown period type '{}'", request.period_type)))?;
    let metric: GoalMetric = request
        .metric
        .parse()
        .map_err(|_| GoalError::UnknownMetric(request.metric.clone()))?;
    if !request.target_value.is_finite() || request.target_value <= 0.0 {
        return Err(GoalError::InvalidTarget(request.target_value));
    }

    let (period_start, period_end) = match period_type {
        PeriodType::Month => {
            let month = period::parse_month(&request.period_start)
                .map(|m| m.start)
                .map_or_else(|| parse_date(&request.period_start), Ok)?;
            (period::first_of_month(month), None)
        }
        PeriodType::Promo => {
            let start = parse_date(&request.period_start)?;
            let end = request
                .period_end
                .as_deref()
                .ok_or_else(|| GoalError::InvalidPeriod("promo goals need a period_end".into()))
                .and_then(parse_date)?;
            if end < start {
                return Err(GoalError::InvalidPeriod(format!(
                    "period_end {end} is before period_start {start}"
                )));
            }
            (start, Some(end))
        }
    };

    let mut service_id = None;
    let mut package_promo_id = None;
    match metric {
        GoalMetric::ServiceAvailment => {
            let id = request.service_id.ok_or(GoalError::MissingTarget("service_id"))?;
            if get_service(conn, id)?.is_none() {
                return Err(GoalError::UnknownService(id));
            }
            service_id = Some(id);
        }
        GoalMetric::PackagePromoAvailment => {
            let id = request
                .package_promo_id
                .ok_or(GoalError::MissingTarget("package_promo_id"))?;
            if get_service(conn, id)?.is_none() {
                return Err(GoalError::UnknownService(id));
            }
            if !is_package_promo(conn, id)? {
                return Err(GoalError::NotAPackage(id));
            }
            package_promo_id = Some(id);
        }
        _ => {}
    }

    let id = insert_goal(conn, &NewGoal {
        period_type,
        period_start,
        period_end,
        metric,
        target_value: request.target_value,
        status: GoalStatus::Active,
        service_id,
        package_promo_id,
        created_by: Some(admin.id),
    })?;
    tracing::info!(goal_id = id, metric = %metric, start = %period_start, "Performance goal created");

    get_goal(conn, id)?.ok_or_else(|| {
        GoalError::Database(DatabaseError::NotFound {
            entity_type: "PerformanceGoal".into(),
            id: id.to_string(),
        })
    })
}

/// Goals active during `month` (`YYYY-MM`) with their latest snapshot.
pub fn list_goals_for_month(
    conn: &Connection,
    month: &str,
    today: NaiveDate,
) -> Result<Vec<GoalOverview>, GoalError> {
    let range = period::parse_month(month)
        .ok_or_else(|| GoalError::InvalidPeriod(format!("'{month}' is not a YYYY-MM month")))?;
    let mut overviews = Vec::new();
    for goal in list_goals_overlapping(conn, &range)? {
        let latest_actual = latest_snapshot(conn, goal.id)?.map(|s| s.actual_value);
        let progress = derive_progress(&goal, latest_actual, today);
        overviews.push(GoalOverview {
            goal,
            latest_actual,
            progress,
        });
    }
    Ok(overviews)
}

/// Creates the standard monthly targets (visits, revenue, completion rate)
/// for every month of `range`. Returns the number of goals created.
pub fn seed_monthly_goals(
    conn: &Connection,
    admin: &User,
    range: &DateRange,
    config: &SeedConfig,
) -> Result<usize, DatabaseError> {
    let targets = [
        (GoalMetric::TotalVisits, config.visits_target),
        (GoalMetric::Revenue, config.revenue_target),
        (GoalMetric::AppointmentCompletionRate, config.completion_rate_target),
    ];
    let mut created = 0;
    for month in range.months() {
        for (metric, target) in targets {
            insert_goal(conn, &NewGoal::monthly(month.start, metric, target).created_by(admin.id))?;
            created += 1;
        }
    }
    tracing::info!(goals = created, "Performance goals generated");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{add_bundle_item, insert_service, insert_user};
    use crate::db::sqlite::open_memory_database;
    use crate::models::NewService;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Connection, User) {
        let conn = open_memory_database().unwrap();
        let admin = insert_user(&conn, "Dr. Admin", "admin@clinic.test", UserRole::Admin).unwrap();
        (conn, admin)
    }

    fn request(period_type: &str, start: &str, metric: &str) -> GoalRequest {
        GoalRequest {
            period_type: period_type.into(),
            period_start: start.into(),
            period_end: None,
            metric: metric.into(),
            target_value: 100.0,
            service_id: None,
            package_promo_id: None,
        }
    }

    fn service(conn: &Connection, name: &str, is_special: bool) -> i64 {
        insert_service(conn, &NewService {
            name: name.into(),
            description: None,
            price: Some(1500.0),
            category: None,
            estimated_minutes: None,
            is_special,
            special_start_date: None,
            special_end_date: None,
            is_excluded_from_analytics: false,
        })
        .unwrap()
    }

    #[test]
    fn month_goal_normalizes_to_first_day() {
        let (conn, admin) = setup();
        let goal = create_goal(&conn, &admin, &request("month", "2025-08-19", "total_visits")).unwrap();
        assert_eq!(goal.period_start, date(2025, 8, 1));
        assert_eq!(goal.period_end, None);
        assert_eq!(goal.created_by, Some(admin.id));
        assert_eq!(goal.status, GoalStatus::Active);

        let from_month = create_goal(&conn, &admin, &request("month", "2025-09", "revenue")).unwrap();
        assert_eq!(from_month.period_start, date(2025, 9, 1));
    }

    #[test]
    fn request_parses_from_json_payload() {
        let payload = r#"{"period_type":"promo","period_start":"2025-05-01",
                          "period_end":"2025-05-20","metric":"total_visits","target_value":40}"#;
        let parsed: GoalRequest = serde_json::from_str(payload).unwrap();
        let (conn, admin) = setup();
        let goal = create_goal(&conn, &admin, &parsed).unwrap();
        assert_eq!(goal.period_type, PeriodType::Promo);
        assert_eq!(goal.period().num_days(), 20);
    }

    #[test]
    fn promo_goal_requires_ordered_end() {
        let (conn, admin) = setup();
        let missing_end = create_goal(&conn, &admin, &request("promo", "2025-05-01", "total_visits"));
        assert!(matches!(missing_end, Err(GoalError::InvalidPeriod(_))));

        let mut inverted = request("promo", "2025-05-10", "total_visits");
        inverted.period_end = Some("2025-05-01".into());
        assert!(matches!(create_goal(&conn, &admin, &inverted), Err(GoalError::InvalidPeriod(_))));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let (conn, admin) = setup();
        assert!(matches!(
            create_goal(&conn, &admin, &request("quarter", "2025-05-01", "total_visits")),
            Err(GoalError::InvalidPeriod(_))
        ));
        assert!(matches!(
            create_goal(&conn, &admin, &request("month", "2025-05-01", "smiles")),
            Err(GoalError::UnknownMetric(_))
        ));
        let mut zero = request("month", "2025-05-01", "total_visits");
        zero.target_value = 0.0;
        assert!(matches!(create_goal(&conn, &admin, &zero), Err(GoalError::InvalidTarget(_))));
    }

    #[test]
    fn only_admins_create_goals() {
        let (conn, _) = setup();
        let staff = insert_user(&conn, "Front Desk", "desk@clinic.test", UserRole::Staff).unwrap();
        let result = create_goal(&conn, &staff, &request("month", "2025-05-01", "total_visits"));
        assert!(matches!(result, Err(GoalError::NotAuthorized(_))));
    }

    #[test]
    fn service_availment_needs_existing_service() {
        let (conn, admin) = setup();
        let missing = create_goal(&conn, &admin, &request("month", "2025-05-01", "service_availment"));
        assert!(matches!(missing, Err(GoalError::MissingTarget("service_id"))));

        let mut unknown = request("month", "2025-05-01", "service_availment");
        unknown.service_id = Some(99);
        assert!(matches!(create_goal(&conn, &admin, &unknown), Err(GoalError::UnknownService(99))));

        let id = service(&conn, "Dental Checkup", false);
        let mut valid = request("month", "2025-05-01", "service_availment");
        valid.service_id = Some(id);
        valid.package_promo_id = Some(id);
        let goal = create_goal(&conn, &admin, &valid).unwrap();
        assert_eq!(goal.service_id, Some(id));
        assert_eq!(goal.package_promo_id, None);
    }

    #[test]
    fn package_availment_needs_a_package() {
        let (conn, admin) = setup();
        let plain = service(&conn, "Dental Checkup", false);
        let mut req = request("month", "2025-05-01", "package_promo_availment");
        req.package_promo_id = Some(plain);
        assert!(matches!(create_goal(&conn, &admin, &req), Err(GoalError::NotAPackage(_))));

        let bundle = service(&conn, "Braces Starter Pack", false);
        add_bundle_item(&conn, bundle, plain).unwrap();
        req.package_promo_id = Some(bundle);
        let goal = create_goal(&conn, &admin, &req).unwrap();
        assert_eq!(goal.package_promo_id, Some(bundle));

        let promo = service(&conn, "Holiday Whitening", true);
        req.package_promo_id = Some(promo);
        assert!(create_goal(&conn, &admin, &req).is_ok());
    }

    #[test]
    fn month_listing_includes_latest_actual() {
        let (conn, admin) = setup();
        let goal = create_goal(&conn, &admin, &request("month", "2025-05-01", "total_visits")).unwrap();
        create_goal(&conn, &admin, &request("month", "2025-06-01", "total_visits")).unwrap();
        crate::db::repository::insert_snapshot(&conn, goal.id, date(2025, 5, 31), 120.0).unwrap();

        let listed = list_goals_for_month(&conn, "2025-05", date(2025, 6, 10)).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].goal.id, goal.id);
        assert_eq!(listed[0].latest_actual, Some(120.0));
        assert_eq!(listed[0].progress.label, ProgressLabel::OnTrack);

        assert!(matches!(
            list_goals_for_month(&conn, "May 2025", date(2025, 6, 10)),
            Err(GoalError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn seeded_goals_cover_every_month() {
        let (conn, admin) = setup();
        let range = DateRange::new(date(2024, 6, 1), date(2025, 6, 30)).unwrap();
        let created = seed_monthly_goals(&conn, &admin, &range, &SeedConfig::default()).unwrap();
        assert_eq!(created, 39);
        let june = DateRange::month_of(date(2025, 6, 1));
        assert_eq!(list_goals_overlapping(&conn, &june).unwrap().len(), 3);
    }

    #[test]
    fn goal_owner_requires_an_admin() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, "Front Desk", "desk@clinic.test", UserRole::Staff).unwrap();
        assert!(matches!(goal_owner(&conn), Err(GoalError::NoAdministrator)));

        let admin = insert_user(&conn, "Dr. Admin", "admin@clinic.test", UserRole::Admin).unwrap();
        assert_eq!(goal_owner(&conn).unwrap().id, admin.id);
    }
}
