use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::VisitStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub patient_id: i64,
    pub service_id: Option<i64>,
    pub visit_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub status: VisitStatus,
    pub note: Option<String>,
    pub correlation_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVisit {
    pub patient_id: i64,
    pub service_id: Option<i64>,
    pub visit_date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub status: VisitStatus,
    pub note: Option<String>,
    /// Provisional key that payments use to find this visit once it has an id.
    pub correlation_token: Option<String>,
}
