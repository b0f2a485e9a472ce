use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use super::draw;
use crate::db::repository::{insert_appointments, insert_linked_payments, insert_visits};
use crate::db::DatabaseError;
use crate::models::enums::{AppointmentStatus, PaymentStatus, VisitStatus};
use crate::models::{DateRange, NewAppointment, NewVisit, PaymentDraft, ServiceRef};

/// Records drafted for one reporting period, not yet persisted.
#[derive(Debug, Default)]
pub struct MonthBatch {
    pub visits: Vec<NewVisit>,
    pub appointments: Vec<NewAppointment>,
    pub payments: Vec<PaymentDraft>,
}

/// Rows written for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchCounts {
    pub visits: usize,
    pub appointments: usize,
    pub payments: usize,
}

/// Drafts visits, appointments and payments from fixed patient/service pools.
///
/// Each visit gets a correlation token `<run>:<sequence>` that its payment
/// draft repeats, so payments can be joined to visit ids after insertion.
pub struct VisitGenerator<'a, R: Rng> {
    rng: &'a mut R,
    patients: &'a [i64],
    services: &'a [ServiceRef],
    admin_id: i64,
    fallback_price: f64,
    currency: String,
    run_id: Uuid,
    sequence: u64,
}

impl<'a, R: Rng> VisitGenerator<'a, R> {
    /// Returns `None` when either pool is empty.
    pub fn new(
        rng: &'a mut R,
        patients: &'a [i64],
        services: &'a [ServiceRef],
        admin_id: i64,
        fallback_price: f64,
        currency: &str,
    ) -> Option<Self> {
        if patients.is_empty() || services.is_empty() {
            return None;
        }
        let run_id = random_uuid(rng);
        Some(Self {
            rng,
            patients,
            services,
            admin_id,
            fallback_price,
            currency: currency.into(),
            run_id,
            sequence: 0,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Drafts every open day of `range`.
    pub fn generate(&mut self, range: &DateRange) -> MonthBatch {
        let mut batch = MonthBatch::default();
        let mut day = range.start;
        while day <= range.end {
            self.generate_day(day, &mut batch);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        batch
    }

    pub fn generate_day(&mut self, day: NaiveDate, batch: &mut MonthBatch) {
        let count = draw::daily_visit_count(self.rng, day);
        for _ in 0..count {
            self.generate_visit(day, batch);
        }
    }

    fn generate_visit(&mut self, day: NaiveDate, batch: &mut MonthBatch) {
        let (Some(&patient_id), Some(&service)) = (
            self.patients.choose(self.rng),
            self.services.choose(self.rng),
        ) else {
            return;
        };
        let slot = draw::time_slot(self.rng, day);
        let status = draw::visit_status(self.rng);

        self.sequence += 1;
        let token = format!("{}:{}", self.run_id, self.sequence);

        batch.visits.push(NewVisit {
            patient_id,
            service_id: Some(service.id),
            visit_date: day,
            start_time: slot.start,
            end_time: Some(slot.end),
            status,
            note: draw::visit_note(self.rng),
            correlation_token: Some(token.clone()),
        });

        if draw::wants_appointment(self.rng) {
            let appointment_status = AppointmentStatus::from_visit(status);
            batch.appointments.push(NewAppointment {
                patient_id,
                service_id: Some(service.id),
                date: day,
                time_slot: slot.label(),
                reference_code: format!("APT{}", self.reference_suffix()),
                status: appointment_status,
                payment_method: draw::payment_method(self.rng),
                payment_status: draw::appointment_payment_status(self.rng, appointment_status),
                notes: draw::appointment_note(self.rng),
            });
        }

        if status == VisitStatus::Completed {
            let amount = service.price.unwrap_or(self.fallback_price);
            batch.payments.push(PaymentDraft {
                visit_token: token,
                currency: self.currency.clone(),
                amount_due: amount,
                amount_paid: amount,
                method: draw::payment_method(self.rng),
                status: PaymentStatus::Paid,
                reference_no: format!("PAY{}", self.reference_suffix()),
                paid_at: Some(slot.end),
                created_by: Some(self.admin_id),
            });
        }
    }

    fn reference_suffix(&mut self) -> String {
        random_uuid(self.rng).simple().to_string().to_uppercase()
    }
}

/// UUID v4 drawn from the caller's generator, so seeded runs repeat.
fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Writes a drafted period: visits first, then appointments, then payments
/// joined to the visits they settle. All or nothing.
pub fn persist_batch(
    conn: &Connection,
    batch: &MonthBatch,
    chunk_size: usize,
) -> Result<BatchCounts, DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    let visits = insert_visits(&tx, &batch.visits, chunk_size)?;
    let appointments = insert_appointments(&tx, &batch.appointments, chunk_size)?;
    let payments = insert_linked_payments(&tx, &batch.payments, chunk_size)?;
    tx.commit()?;
    Ok(BatchCounts {
        visits,
        appointments,
        payments,
    })
}
