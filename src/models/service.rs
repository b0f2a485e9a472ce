use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub estimated_minutes: Option<i64>,
    pub is_special: bool,
    pub special_start_date: Option<NaiveDate>,
    pub special_end_date: Option<NaiveDate>,
    pub is_excluded_from_analytics: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub estimated_minutes: Option<i64>,
    pub is_special: bool,
    pub special_start_date: Option<NaiveDate>,
    pub special_end_date: Option<NaiveDate>,
    pub is_excluded_from_analytics: bool,
}

/// Minimal service projection used when drafting visits and payments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: i64,
    pub price: Option<f64>,
}
