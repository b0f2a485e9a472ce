use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{PaymentMethod, PaymentStatus};

pub const DEFAULT_CURRENCY: &str = "PHP";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub appointment_id: Option<i64>,
    pub patient_visit_id: Option<i64>,
    pub currency: String,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference_no: String,
    pub paid_at: Option<NaiveDateTime>,
    pub created_by: Option<i64>,
}

/// A payment whose visit id is not known yet. `visit_token` names the
/// visit by its correlation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub visit_token: String,
    pub currency: String,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference_no: String,
    pub paid_at: Option<NaiveDateTime>,
    pub created_by: Option<i64>,
}
