//! In-memory collaborators for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{DriverDirectory, DriverMessage, Ledger, Notifier, ReservationStore, WorkOrder, WorkOrderSink};
use crate::error::{AppError, AppResult};
use crate::reservation::{PaymentMethod, Reservation};

#[derive(Default)]
pub struct MemoryDriverDirectory {
    drivers: Mutex<HashMap<Uuid, bool>>,
}

impl MemoryDriverDirectory {
    pub fn add(&self, active: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.drivers.lock().unwrap().insert(id, active);
        id
    }
}

#[async_trait]
impl DriverDirectory for MemoryDriverDirectory {
    async fn is_driver_active(&self, driver_id: Uuid) -> AppResult<bool> {
        Ok(self.drivers.lock().unwrap().get(&driver_id).copied().unwrap_or(false))
    }
}

#[derive(Default)]
pub struct MemoryReservationStore {
    rows: Mutex<HashMap<Uuid, Reservation>>,
}

impl MemoryReservationStore {
    pub fn get(&self, id: Uuid) -> Option<Reservation> {
        self.rows.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ReservationStore for MemoryReservationStore {
    async fn load(&self, id: Uuid) -> AppResult<Reservation> {
        let found = self.get(id);
        // Let concurrent callers read the same version before anyone saves
        tokio::task::yield_now().await;
        found.ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))
    }

    async fn list(&self) -> AppResult<Vec<Reservation>> {
        let mut all: Vec<Reservation> = self.rows.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn insert(&self, reservation: &Reservation) -> AppResult<Reservation> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&reservation.id)
            || rows.values().any(|r| r.reservation_code == reservation.reservation_code)
        {
            return Err(AppError::Conflict("Reservation already exists".to_string()));
        }
        rows.insert(reservation.id, reservation.clone());
        Ok(reservation.clone())
    }

    async fn save(&self, reservation: &Reservation, expected_version: i32) -> AppResult<Reservation> {
        let mut rows = self.rows.lock().unwrap();
        let stored = rows
            .get_mut(&reservation.id)
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;

        if stored.version != expected_version {
            return Err(AppError::Conflict(format!(
                "reservation {} was modified concurrently",
                reservation.reservation_code
            )));
        }

        let mut saved = reservation.clone();
        saved.version = expected_version + 1;
        *stored = saved.clone();
        Ok(saved)
    }

    async fn delete(&self, id: Uuid, expected_version: i32) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get(&id) {
            None => Err(AppError::NotFound("Reservation not found".to_string())),
            Some(r) if r.version != expected_version => {
                Err(AppError::Conflict("reservation was modified concurrently".to_string()))
            }
            Some(_) => {
                rows.remove(&id);
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct MemoryLedger {
    pub entries: Mutex<Vec<(Uuid, PaymentMethod, f64)>>,
    pub fail: AtomicBool,
    pub hang: AtomicBool,
    /// Records the entry, then never answers.
    pub hang_after_commit: AtomicBool,
    /// One entry per reservation; repeats succeed without a new entry.
    pub unique: AtomicBool,
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn record_completion(
        &self,
        reservation_id: Uuid,
        payment_method: PaymentMethod,
        amount: f64,
    ) -> AppResult<()> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("ledger unavailable".to_string()));
        }

        {
            let mut entries = self.entries.lock().unwrap();
            let recorded = entries.iter().any(|(id, _, _)| *id == reservation_id);
            if !(recorded && self.unique.load(Ordering::SeqCst)) {
                entries.push((reservation_id, payment_method, amount));
            }
        }

        if self.hang_after_commit.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryNotifier {
    pub sent: Mutex<Vec<(String, DriverMessage)>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn notify_driver(&self, phone: &str, message: &DriverMessage) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("gateway down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), message.clone()));
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryWorkOrders {
    pub published: Mutex<Vec<WorkOrder>>,
}

#[async_trait]
impl WorkOrderSink for MemoryWorkOrders {
    async fn publish(&self, order: &WorkOrder) -> AppResult<()> {
        self.published.lock().unwrap().push(order.clone());
        Ok(())
    }
}
