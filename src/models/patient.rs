use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::Sex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    /// Linked to a patient portal account.
    pub is_linked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub sex: Option<Sex>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub is_linked: bool,
}
