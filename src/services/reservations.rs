use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::collaborators::{DriverDirectory, Ledger, Notifier, ReservationStore, WorkOrderSink};
use crate::error::{AppError, AppResult};
use crate::reservation::{
    self, lifecycle, AssignmentChoice, NewReservation, Reservation, ReservationEdit, SideEffect,
    Transition,
};
use crate::utils::reservation_code::ReservationCodeGenerator;

const MAX_CODE_ATTEMPTS: usize = 3;

/// The collaborators a [`ReservationService`] talks to.
pub struct Collaborators {
    pub store: Arc<dyn ReservationStore>,
    pub drivers: Arc<dyn DriverDirectory>,
    pub ledger: Arc<dyn Ledger>,
    pub notifier: Arc<dyn Notifier>,
    pub work_orders: Arc<dyn WorkOrderSink>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentReport {
    pub reservation: Reservation,
    /// Advisory failures of notification or work order delivery.
    pub warnings: Vec<String>,
}

/// Runs reservation operations as load, pure change, conditional save.
pub struct ReservationService {
    store: Arc<dyn ReservationStore>,
    drivers: Arc<dyn DriverDirectory>,
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    work_orders: Arc<dyn WorkOrderSink>,
    codes: ReservationCodeGenerator,
    collaborator_timeout: Duration,
}

impl ReservationService {
    pub fn new(
        collaborators: Collaborators,
        codes: ReservationCodeGenerator,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            store: collaborators.store,
            drivers: collaborators.drivers,
            ledger: collaborators.ledger,
            notifier: collaborators.notifier,
            work_orders: collaborators.work_orders,
            codes,
            collaborator_timeout,
        }
    }

    /// Store a new `pending` reservation priced at `total_price`.
    pub async fn create(&self, new: NewReservation, total_price: f64) -> AppResult<Reservation> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let candidate = Reservation::create(new.clone(), self.codes.next_code(), total_price, Utc::now())?;

            match self.store.insert(&candidate).await {
                Ok(created) => {
                    tracing::info!(
                        reservation_code = %created.reservation_code,
                        total_price = created.total_price,
                        "Reservation created"
                    );
                    return Ok(created);
                }
                Err(AppError::Conflict(reason)) if attempt < MAX_CODE_ATTEMPTS => {
                    tracing::warn!(%reason, attempt, "Reservation code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Reservation> {
        self.store.load(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Reservation>> {
        self.store.list().await
    }

    pub async fn edit(&self, id: Uuid, edit: ReservationEdit) -> AppResult<Reservation> {
        let current = self.store.load(id).await?;
        let edited = current.apply_edit(edit, Utc::now())?;
        let saved = self.store.save(&edited, current.version).await?;

        tracing::info!(reservation_code = %saved.reservation_code, "Reservation edited");
        Ok(saved)
    }

    /// Assign a driver. Notification and work order failures come back as
    /// warnings; the saved assignment stands regardless.
    pub async fn assign(&self, id: Uuid, choice: AssignmentChoice) -> AppResult<AssignmentReport> {
        let current = self.store.load(id).await?;
        let outcome = reservation::assign(&current, choice, self.drivers.as_ref(), Utc::now()).await?;
        let saved = self.store.save(&outcome.reservation, current.version).await?;

        tracing::info!(
            reservation_code = %saved.reservation_code,
            assignment = ?saved.assignment,
            "Reservation assigned"
        );

        let mut warnings = Vec::new();
        for effect in outcome.side_effects {
            let result = match &effect {
                SideEffect::NotifyDriver { phone, message } => {
                    self.call("driver notification", self.notifier.notify_driver(phone, message))
                        .await
                }
                SideEffect::PrintWorkOrder(order) => {
                    self.call("work order", self.work_orders.publish(order)).await
                }
            };

            if let Err(e) = result {
                tracing::warn!(
                    reservation_code = %saved.reservation_code,
                    error = %e,
                    "Assignment side effect failed"
                );
                warnings.push(e.to_string());
            }
        }

        Ok(AssignmentReport {
            reservation: saved,
            warnings,
        })
    }

    pub async fn transition(&self, id: Uuid, transition: Transition) -> AppResult<Reservation> {
        if transition == Transition::Complete {
            return self.complete(id).await;
        }

        let current = self.store.load(id).await?;
        let next = lifecycle::transition(&current, transition, Utc::now())?;
        let saved = self.store.save(&next, current.version).await?;

        tracing::info!(
            reservation_code = %saved.reservation_code,
            from = current.status.as_str(),
            to = saved.status.as_str(),
            "Reservation status changed"
        );
        Ok(saved)
    }

    /// Complete a trip and bill it as one unit.
    ///
    /// The status write goes first so a concurrent completion loses on the
    /// version check before anything is billed. If the ledger then fails,
    /// the previous state is written back and the caller gets the error.
    pub async fn complete(&self, id: Uuid) -> AppResult<Reservation> {
        let current = self.store.load(id).await?;
        let completed = lifecycle::complete(&current, Utc::now())?;
        let saved = self.store.save(&completed, current.version).await?;

        let billed = self
            .call(
                "ledger",
                self.ledger
                    .record_completion(saved.id, saved.payment_method, saved.total_price),
            )
            .await;

        match billed {
            Ok(()) => {
                tracing::info!(
                    reservation_code = %saved.reservation_code,
                    payment_method = ?saved.payment_method,
                    amount = saved.total_price,
                    "Reservation completed"
                );
                Ok(saved)
            }
            Err(e) => {
                tracing::error!(
                    reservation_code = %saved.reservation_code,
                    error = %e,
                    "Ledger entry failed, rolling back completion"
                );
                if let Err(revert) = self.store.save(&current, saved.version).await {
                    tracing::error!(
                        reservation_code = %saved.reservation_code,
                        error = %revert,
                        "Could not roll back completion"
                    );
                }
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let current = self.store.load(id).await?;
        lifecycle::ensure_deletable(&current)?;
        self.store.delete(id, current.version).await?;

        tracing::info!(reservation_code = %current.reservation_code, "Reservation deleted");
        Ok(())
    }

    async fn call<T>(
        &self,
        name: &str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.collaborator_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AppError::ExternalCollaborator(format!("{}: {}", name, e))),
            Err(_) => Err(AppError::ExternalCollaborator(format!(
                "{} timed out after {:?}",
                name, self.collaborator_timeout
            ))),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::reservation::fixtures::new_reservation;
    use crate::reservation::{Assignment, PaymentMethod, ReservationStatus};
    use std::sync::atomic::Ordering;

    fn manual_choice() -> AssignmentChoice {
        AssignmentChoice::Manual {
            driver_name: Some("Jordi".to_string()),
            driver_phone: Some("+34600999888".to_string()),
            plate_number: Some("1234-BCD".to_string()),
            agreed_price: Some(25.0),
        }
    }

    async fn created(h: &Harness, method: PaymentMethod) -> Reservation {
        h.service.create(new_reservation(method), 33.0).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_issues_unique_codes() {
        let h = harness();
        let a = created(&h, PaymentMethod::Cash).await;
        let b = created(&h, PaymentMethod::Cash).await;

        assert!(a.reservation_code.starts_with("TRF-"));
        assert_ne!(a.reservation_code, b.reservation_code);
        assert_eq!(h.service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_manual_assignment_dispatches_side_effects() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;

        let report = h.service.assign(reservation.id, manual_choice()).await.unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(report.reservation.status, ReservationStatus::Assigned);
        assert_eq!(report.reservation.version, 1);
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
        assert_eq!(h.work_orders.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_is_a_warning() {
        let h = harness();
        h.notifier.fail.store(true, Ordering::SeqCst);
        let reservation = created(&h, PaymentMethod::Cash).await;

        let report = h.service.assign(reservation.id, manual_choice()).await.unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("driver notification"));
        let stored = h.store.get(reservation.id).unwrap();
        assert_eq!(stored.status, ReservationStatus::Assigned);
        assert_eq!(h.work_orders.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_system_assignment_then_reassignment_is_rejected() {
        let h = harness();
        let driver_id = h.drivers.add(true);
        let reservation = created(&h, PaymentMethod::Card).await;

        h.service
            .assign(
                reservation.id,
                AssignmentChoice::System {
                    driver_id,
                    vehicle_id: Uuid::new_v4(),
                },
            )
            .await
            .unwrap();

        let err = h.service.assign(reservation.id, manual_choice()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let stored = h.store.get(reservation.id).unwrap();
        assert!(matches!(stored.assignment, Some(Assignment::System { .. })));
        assert!(h.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_cash_records_ledger_entry() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;
        h.service.assign(reservation.id, manual_choice()).await.unwrap();

        let completed = h.service.transition(reservation.id, Transition::Complete).await.unwrap();

        assert_eq!(completed.status, ReservationStatus::Completed);
        let entries = h.ledger.entries.lock().unwrap();
        assert_eq!(entries.as_slice(), &[(reservation.id, PaymentMethod::Cash, 33.0)]);
    }

    #[tokio::test]
    async fn test_complete_without_driver_is_rejected() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;

        let err = h.service.complete(reservation.id).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        let stored = h.store.get(reservation.id).unwrap();
        assert_eq!(stored.status, ReservationStatus::Pending);
        assert!(h.ledger.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ledger_failure_fails_the_completion() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Card).await;
        h.service.assign(reservation.id, manual_choice()).await.unwrap();
        h.ledger.fail.store(true, Ordering::SeqCst);

        let err = h.service.complete(reservation.id).await.unwrap_err();

        assert!(matches!(err, AppError::ExternalCollaborator(_)));
        let stored = h.store.get(reservation.id).unwrap();
        assert_eq!(stored.status, ReservationStatus::Assigned);

        // A retry once the ledger is back goes through
        h.ledger.fail.store(false, Ordering::SeqCst);
        let completed = h.service.complete(reservation.id).await.unwrap();
        assert_eq!(completed.status, ReservationStatus::Completed);
        assert_eq!(h.ledger.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_timeout_fails_the_completion() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;
        h.service.assign(reservation.id, manual_choice()).await.unwrap();
        h.ledger.hang.store(true, Ordering::SeqCst);

        let err = h.service.complete(reservation.id).await.unwrap_err();

        assert!(matches!(err, AppError::ExternalCollaborator(msg) if msg.contains("timed out")));
        assert_eq!(
            h.store.get(reservation.id).unwrap().status,
            ReservationStatus::Assigned
        );
    }

    #[tokio::test]
    async fn test_retry_after_late_ledger_commit_completes_once() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Card).await;
        h.service.assign(reservation.id, manual_choice()).await.unwrap();
        h.ledger.unique.store(true, Ordering::SeqCst);
        h.ledger.hang_after_commit.store(true, Ordering::SeqCst);

        // The entry lands but the answer never comes back in time
        let err = h.service.complete(reservation.id).await.unwrap_err();
        assert!(matches!(err, AppError::ExternalCollaborator(msg) if msg.contains("timed out")));
        assert_eq!(
            h.store.get(reservation.id).unwrap().status,
            ReservationStatus::Assigned
        );
        assert_eq!(h.ledger.entries.lock().unwrap().len(), 1);

        h.ledger.hang_after_commit.store(false, Ordering::SeqCst);
        let completed = h.service.complete(reservation.id).await.unwrap();

        assert_eq!(completed.status, ReservationStatus::Completed);
        assert_eq!(h.ledger.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_completions_bill_once() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;
        h.service.assign(reservation.id, manual_choice()).await.unwrap();

        let (first, second) = tokio::join!(
            h.service.complete(reservation.id),
            h.service.complete(reservation.id)
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(AppError::Conflict(_))))
                .count(),
            1
        );
        assert_eq!(h.ledger.entries.lock().unwrap().len(), 1);
        assert_eq!(
            h.store.get(reservation.id).unwrap().status,
            ReservationStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_stale_write_is_a_conflict() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;
        h.service.assign(reservation.id, manual_choice()).await.unwrap();

        // A writer still holding version 0 must not overwrite the assignment
        let stale = lifecycle::confirm(&reservation, Utc::now()).unwrap();
        let err = h.store.save(&stale, reservation.version).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(
            h.store.get(reservation.id).unwrap().status,
            ReservationStatus::Assigned
        );
    }

    #[tokio::test]
    async fn test_cancel_and_delete() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;

        let cancelled = h
            .service
            .transition(
                reservation.id,
                Transition::Cancel {
                    reason: "flight cancelled".to_string(),
                    by: "ops".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(cancelled.status, ReservationStatus::Cancelled);
        assert_eq!(cancelled.cancellation.unwrap().reason, "flight cancelled");

        h.service.delete(reservation.id).await.unwrap();
        assert!(matches!(
            h.service.get(reservation.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_assigned_reservation_cannot_be_deleted() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;
        h.service.assign(reservation.id, manual_choice()).await.unwrap();

        let err = h.service.delete(reservation.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert!(h.store.get(reservation.id).is_some());
    }

    #[tokio::test]
    async fn test_edit_bumps_version() {
        let h = harness();
        let reservation = created(&h, PaymentMethod::Cash).await;

        let edited = h
            .service
            .edit(
                reservation.id,
                ReservationEdit {
                    total_price: Some(45.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.total_price, 45.0);
        assert_eq!(edited.version, 1);
        assert_eq!(edited.status, ReservationStatus::Pending);
    }
}
