//! Tops up the patient and service pools a seeding run draws from.

use chrono::{Duration, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;

use crate::db::repository::{
    count_patients, insert_patients, insert_service, list_patient_ids, list_service_refs,
};
use crate::db::DatabaseError;
use crate::models::enums::Sex;
use crate::models::{NewPatient, NewService, ServiceRef};

const FIRST_NAMES: &[&str] = &[
    "Maria", "Jose", "Ana", "Juan", "Carmela", "Miguel", "Rosa", "Antonio", "Liza", "Paolo",
    "Kristine", "Ramon", "Angelica", "Enrique", "Bea", "Marco", "Teresa", "Gabriel", "Joy",
    "Rafael",
];

const LAST_NAMES: &[&str] = &[
    "Santos", "Reyes", "Cruz", "Bautista", "Garcia", "Mendoza", "Torres", "Flores", "Villanueva",
    "Ramos", "Aquino", "Castillo", "Rivera", "Navarro", "Domingo", "Salazar", "Padilla",
    "Gonzales", "Dela Cruz", "Soriano",
];

const CITIES: &[&str] = &[
    "Quezon City, Metro Manila",
    "Makati, Metro Manila",
    "Pasig, Metro Manila",
    "Antipolo, Rizal",
    "Bacoor, Cavite",
    "Calamba, Laguna",
    "Malolos, Bulacan",
    "San Fernando, Pampanga",
];

/// name, price, category, estimated minutes
pub const STANDARD_SERVICES: [(&str, f64, &str, i64); 8] = [
    ("Root Canal Treatment", 8000.0, "Endodontic", 120),
    ("Crown Placement", 12000.0, "Prosthodontic", 90),
    ("Orthodontic Consultation", 1500.0, "Orthodontic", 30),
    ("Dental Implant", 25000.0, "Surgical", 180),
    ("Gum Treatment", 4000.0, "Periodontic", 60),
    ("Oral Surgery", 15000.0, "Surgical", 120),
    ("Dental Checkup", 1000.0, "Preventive", 20),
    ("X-Ray", 500.0, "Diagnostic", 10),
];

const MIN_PATIENT_AGE_YEARS: i64 = 18;
const MAX_PATIENT_AGE_YEARS: i64 = 80;

/// A fabricated, unlinked patient record.
pub fn synthetic_patient<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> NewPatient {
    let pick = |rng: &mut R, pool: &[&str]| pool.choose(rng).copied().unwrap_or_default().to_string();
    let age_days = rng.gen_range(MIN_PATIENT_AGE_YEARS * 365..=MAX_PATIENT_AGE_YEARS * 365);
    NewPatient {
        first_name: pick(rng, FIRST_NAMES),
        last_name: pick(rng, LAST_NAMES),
        middle_name: rng.gen_bool(0.7).then(|| pick(rng, LAST_NAMES)),
        birthdate: today.checked_sub_signed(Duration::days(age_days)),
        sex: Some(if rng.gen_bool(0.5) { Sex::Male } else { Sex::Female }),
        contact_number: Some(format!("09{:08}", rng.gen_range(0..100_000_000u32))),
        address: Some(pick(rng, CITIES)),
        is_linked: false,
    }
}

/// Ensures at least `minimum` patients exist and returns every patient id.
pub fn ensure_patients<R: Rng + ?Sized>(
    conn: &Connection,
    rng: &mut R,
    minimum: usize,
    today: NaiveDate,
    chunk_size: usize,
) -> Result<Vec<i64>, DatabaseError> {
    let existing = count_patients(conn)?.max(0) as usize;
    if existing < minimum {
        let missing = minimum - existing;
        tracing::warn!(existing, missing, "Patient pool below minimum, generating patients");
        let patients: Vec<NewPatient> =
            (0..missing).map(|_| synthetic_patient(rng, today)).collect();
        insert_patients(conn, &patients, chunk_size)?;
    }
    list_patient_ids(conn)
}

/// Ensures the service catalogue holds at least `minimum` entries by adding
/// the standard procedures it lacks, then returns every service.
///
/// Only the eight standard procedures are ever added, so a catalogue that
/// starts with fewer than `minimum - 8` services stays below `minimum`.
pub fn ensure_services(conn: &Connection, minimum: usize) -> Result<Vec<ServiceRef>, DatabaseError> {
    let existing = list_service_refs(conn)?;
    if existing.len() >= minimum {
        return Ok(existing);
    }
    tracing::warn!(existing = existing.len(), minimum, "Service catalogue below minimum, adding standard services");

    let mut names = conn.prepare("SELECT COUNT(*) FROM services WHERE name = ?1")?;
    for (name, price, category, minutes) in STANDARD_SERVICES {
        let present: i64 = names.query_row([name], |row| row.get(0))?;
        if present > 0 {
            continue;
        }
        insert_service(conn, &NewService {
            name: name.into(),
            description: Some(format!("Professional {}", name.to_lowercase())),
            price: Some(price),
            category: Some(category.into()),
            estimated_minutes: Some(minutes),
            is_special: false,
            special_start_date: None,
            special_end_date: None,
            is_excluded_from_analytics: false,
        })?;
    }
    list_service_refs(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn synthetic_patients_are_adults_with_local_numbers() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..100 {
            let patient = synthetic_patient(&mut rng, today());
            let age_days = (today() - patient.birthdate.unwrap()).num_days();
            assert!((18 * 365..=80 * 365).contains(&age_days));
            let contact = patient.contact_number.unwrap();
            assert_eq!(contact.len(), 10);
            assert!(contact.starts_with("09"));
            assert!(!patient.is_linked);
        }
    }

    #[test]
    fn ensure_patients_tops_up_to_minimum() {
        let conn = open_memory_database().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let ids = ensure_patients(&conn, &mut rng, 50, today(), 1000).unwrap();
        assert_eq!(ids.len(), 50);

        // Already satisfied: nothing new is created.
        let again = ensure_patients(&conn, &mut rng, 50, today(), 1000).unwrap();
        assert_eq!(again, ids);
    }

    #[test]
    fn ensure_services_adds_missing_standard_services() {
        let conn = open_memory_database().unwrap();
        insert_service(&conn, &NewService {
            name: "X-Ray".into(),
            description: None,
            price: Some(650.0),
            category: None,
            estimated_minutes: None,
            is_special: false,
            special_start_date: None,
            special_end_date: None,
            is_excluded_from_analytics: false,
        })
        .unwrap();

        let services = ensure_services(&conn, 10).unwrap();
        assert_eq!(services.len(), 8);
        // The clinic's own X-Ray price is kept.
        assert_eq!(services[0].price, Some(650.0));
    }

    #[test]
    fn ensure_services_leaves_full_catalogue_alone() {
        let conn = open_memory_database().unwrap();
        let first = ensure_services(&conn, 8).unwrap();
        let second = ensure_services(&conn, 8).unwrap();
        assert_eq!(first, second);
    }
}
