use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{AppointmentStatus, PaymentMethod, PaymentStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub service_id: Option<i64>,
    pub date: NaiveDate,
    pub time_slot: String, // HH:MM-HH:MM
    pub reference_code: String,
    pub status: AppointmentStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub service_id: Option<i64>,
    pub date: NaiveDate,
    pub time_slot: String,
    pub reference_code: String,
    pub status: AppointmentStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub notes: Option<String>,
}
