//! Interfaces to the systems around the reservation core.
//!
//! The core reads drivers and reservations through these traits and hands
//! billing, messaging and work orders to them. Concrete implementations
//! live in [`crate::db`] (Postgres) and [`notify`] (webhook and log sinks).

pub mod notify;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::reservation::{PaymentMethod, Reservation};

pub use notify::{DriverMessage, LogNotifier, LogWorkOrderSink, WebhookNotifier, WorkOrder};

#[async_trait]
pub trait DriverDirectory: Send + Sync {
    async fn is_driver_active(&self, driver_id: Uuid) -> AppResult<bool>;
}

/// Reservation persistence with conditional writes keyed on `version`.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Fails with `NotFound` when the id is unknown.
    async fn load(&self, id: Uuid) -> AppResult<Reservation>;

    async fn list(&self) -> AppResult<Vec<Reservation>>;

    /// Fails with `Conflict` when the id or reservation code is taken.
    async fn insert(&self, reservation: &Reservation) -> AppResult<Reservation>;

    /// Write `reservation` only if the stored version still equals
    /// `expected_version`. Returns the stored copy with its new version.
    async fn save(&self, reservation: &Reservation, expected_version: i32) -> AppResult<Reservation>;

    async fn delete(&self, id: Uuid, expected_version: i32) -> AppResult<()>;
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Book a completed trip. Cash trips become a commission debt for the
    /// driver, everything else a receivable.
    async fn record_completion(
        &self,
        reservation_id: Uuid,
        payment_method: PaymentMethod,
        amount: f64,
    ) -> AppResult<()>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_driver(&self, phone: &str, message: &DriverMessage) -> AppResult<()>;
}

#[async_trait]
pub trait WorkOrderSink: Send + Sync {
    async fn publish(&self, order: &WorkOrder) -> AppResult<()>;
}
