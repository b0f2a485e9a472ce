use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::{NewService, Service, ServiceRef, DATE_FORMAT};

pub fn insert_service(conn: &Connection, service: &NewService) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO services (name, description, price, category, estimated_minutes,
         is_special, special_start_date, special_end_date, is_excluded_from_analytics)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            service.name,
            service.description,
            service.price,
            service.category,
            service.estimated_minutes,
            service.is_special as i32,
            service.special_start_date.map(|d| d.format(DATE_FORMAT).to_string()),
            service.special_end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            service.is_excluded_from_analytics as i32,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_service(conn: &Connection, id: i64) -> Result<Option<Service>, DatabaseError> {
    let service = conn
        .query_row(
            "SELECT id, name, description, price, category, estimated_minutes,
             is_special, special_start_date, special_end_date, is_excluded_from_analytics
             FROM services WHERE id = ?1",
            params![id],
            |row| {
                Ok(Service {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                    price: row.get(3)?,
                    category: row.get(4)?,
                    estimated_minutes: row.get(5)?,
                    is_special: row.get::<_, i32>(6)? != 0,
                    special_start_date: row
                        .get::<_, Option<String>>(7)?
                        .and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
                    special_end_date: row
                        .get::<_, Option<String>>(8)?
                        .and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
                    is_excluded_from_analytics: row.get::<_, i32>(9)? != 0,
                })
            },
        )
        .optional()?;
    Ok(service)
}

pub fn count_services(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?;
    Ok(count)
}

/// Id and price of every service, in id order.
pub fn list_service_refs(conn: &Connection) -> Result<Vec<ServiceRef>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, price FROM services ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(ServiceRef {
            id: row.get(0)?,
            price: row.get(1)?,
        })
    })?;
    let mut services = Vec::new();
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

/// Adds `item_service_id` to the bundle sold as `bundle_service_id`.
pub fn add_bundle_item(
    conn: &Connection,
    bundle_service_id: i64,
    item_service_id: i64,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO service_bundle_items (bundle_service_id, item_service_id)
         VALUES (?1, ?2)",
        params![bundle_service_id, item_service_id],
    )?;
    Ok(())
}

/// A service is sold as a package/promo when it is flagged special or
/// bundles other services.
pub fn is_package_promo(conn: &Connection, service_id: i64) -> Result<bool, DatabaseError> {
    let is_package: bool = conn.query_row(
        "SELECT EXISTS (
             SELECT 1 FROM services s
             WHERE s.id = ?1
               AND (s.is_special = 1
                    OR EXISTS (SELECT 1 FROM service_bundle_items b
                               WHERE b.bundle_service_id = s.id))
         )",
        params![service_id],
        |row| row.get(0),
    )?;
    Ok(is_package)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn plain(name: &str, price: Option<f64>) -> NewService {
        NewService {
            name: name.into(),
            description: None,
            price,
            category: Some("Preventive".into()),
            estimated_minutes: Some(30),
            is_special: false,
            special_start_date: None,
            special_end_date: None,
            is_excluded_from_analytics: false,
        }
    }

    #[test]
    fn service_insert_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let id = insert_service(&conn, &NewService {
            special_start_date: NaiveDate::from_ymd_opt(2025, 5, 1),
            is_special: true,
            ..plain("Summer Whitening Promo", Some(3500.0))
        })
        .unwrap();

        let service = get_service(&conn, id).unwrap().unwrap();
        assert_eq!(service.name, "Summer Whitening Promo");
        assert_eq!(service.price, Some(3500.0));
        assert!(service.is_special);
        assert_eq!(service.special_start_date, NaiveDate::from_ymd_opt(2025, 5, 1));
        assert!(get_service(&conn, id + 100).unwrap().is_none());
    }

    #[test]
    fn service_refs_keep_missing_price() {
        let conn = open_memory_database().unwrap();
        insert_service(&conn, &plain("Cleaning", Some(1200.0))).unwrap();
        insert_service(&conn, &plain("Consultation", None)).unwrap();

        let refs = list_service_refs(&conn).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].price, Some(1200.0));
        assert_eq!(refs[1].price, None);
        assert_eq!(count_services(&conn).unwrap(), 2);
    }

    #[test]
    fn bundle_makes_service_a_package() {
        let conn = open_memory_database().unwrap();
        let bundle = insert_service(&conn, &plain("Family Care Bundle", Some(5000.0))).unwrap();
        let item = insert_service(&conn, &plain("Cleaning", Some(1200.0))).unwrap();

        assert!(!is_package_promo(&conn, bundle).unwrap());
        add_bundle_item(&conn, bundle, item).unwrap();
        add_bundle_item(&conn, bundle, item).unwrap();
        assert!(is_package_promo(&conn, bundle).unwrap());
        assert!(!is_package_promo(&conn, item).unwrap());
    }
}
