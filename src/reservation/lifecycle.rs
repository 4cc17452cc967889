use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Cancellation, Reservation, ReservationStatus};
use crate::error::{AppError, AppResult};

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Assigned => "assigned",
            ReservationStatus::InProgress => "in_progress",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ReservationStatus::Completed | ReservationStatus::Cancelled)
    }

    /// Whether the assignment engine may bind a driver in this state.
    pub fn accepts_assignment(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }

    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;

        match (self, next) {
            (Pending, Confirmed) => true,
            (Pending | Confirmed, Assigned) => true,
            (Assigned, InProgress) => true,
            (Assigned | InProgress, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Status changes that do not go through the assignment engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Transition {
    Confirm,
    Start,
    Complete,
    Cancel { reason: String, by: String },
}

impl Transition {
    pub fn target(&self) -> ReservationStatus {
        match self {
            Transition::Confirm => ReservationStatus::Confirmed,
            Transition::Start => ReservationStatus::InProgress,
            Transition::Complete => ReservationStatus::Completed,
            Transition::Cancel { .. } => ReservationStatus::Cancelled,
        }
    }
}

pub fn transition(
    reservation: &Reservation,
    transition: Transition,
    now: DateTime<Utc>,
) -> AppResult<Reservation> {
    match transition {
        Transition::Confirm => confirm(reservation, now),
        Transition::Start => start(reservation, now),
        Transition::Complete => complete(reservation, now),
        Transition::Cancel { reason, by } => cancel(reservation, &reason, &by, now),
    }
}

pub fn confirm(reservation: &Reservation, now: DateTime<Utc>) -> AppResult<Reservation> {
    move_to(reservation, ReservationStatus::Confirmed, now)
}

pub fn start(reservation: &Reservation, now: DateTime<Utc>) -> AppResult<Reservation> {
    move_to(reservation, ReservationStatus::InProgress, now)
}

/// Finish the trip. Only a reservation with a driver has something to complete.
pub fn complete(reservation: &Reservation, now: DateTime<Utc>) -> AppResult<Reservation> {
    if reservation.assignment.is_none() {
        return Err(AppError::InvalidState(format!(
            "reservation {} has no driver assigned and cannot be completed; delete it instead",
            reservation.reservation_code
        )));
    }
    move_to(reservation, ReservationStatus::Completed, now)
}

pub fn cancel(
    reservation: &Reservation,
    reason: &str,
    by: &str,
    now: DateTime<Utc>,
) -> AppResult<Reservation> {
    let mut problems = Vec::new();
    if reason.trim().is_empty() {
        problems.push("cancellation reason is required".to_string());
    }
    if by.trim().is_empty() {
        problems.push("cancelled by is required".to_string());
    }
    if !problems.is_empty() {
        return Err(AppError::Validation(problems));
    }

    let mut cancelled = move_to(reservation, ReservationStatus::Cancelled, now)?;
    cancelled.cancellation = Some(Cancellation {
        reason: reason.trim().to_string(),
        by: by.trim().to_string(),
        at: now,
    });
    Ok(cancelled)
}

/// Deletion is not a status change; it is only allowed while no driver is
/// bound and the trip was never completed.
pub fn ensure_deletable(reservation: &Reservation) -> AppResult<()> {
    if reservation.assignment.is_some() {
        return Err(AppError::InvalidState(format!(
            "reservation {} has a driver assigned and cannot be deleted",
            reservation.reservation_code
        )));
    }
    if reservation.status == ReservationStatus::Completed {
        return Err(AppError::InvalidState(format!(
            "reservation {} is completed and cannot be deleted",
            reservation.reservation_code
        )));
    }
    Ok(())
}

fn move_to(
    reservation: &Reservation,
    next: ReservationStatus,
    now: DateTime<Utc>,
) -> AppResult<Reservation> {
    // Assigned is owned by the assignment engine
    if next == ReservationStatus::Assigned || !reservation.status.can_transition_to(next) {
        return Err(AppError::InvalidState(format!(
            "reservation {} cannot move from {} to {}",
            reservation.reservation_code,
            reservation.status.as_str(),
            next.as_str()
        )));
    }

    let mut updated = reservation.clone();
    updated.status = next;
    updated.updated_at = now;
    Ok(updated)
}
