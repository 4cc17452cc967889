use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::{Assignment, Reservation, ReservationStatus};
use crate::collaborators::{DriverDirectory, DriverMessage, WorkOrder};
use crate::error::{AppError, AppResult};

/// What staff picked in the assignment form. Exactly one variant per call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssignmentChoice {
    System {
        driver_id: Uuid,
        vehicle_id: Uuid,
    },
    Manual {
        driver_name: Option<String>,
        driver_phone: Option<String>,
        plate_number: Option<String>,
        agreed_price: Option<f64>,
    },
}

/// Work the caller must hand to external collaborators after saving.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    NotifyDriver { phone: String, message: DriverMessage },
    PrintWorkOrder(WorkOrder),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub reservation: Reservation,
    pub side_effects: Vec<SideEffect>,
}

/// Bind a driver to a reservation and move it to `assigned`.
///
/// Checks run in order: reservation state, manual driver completeness,
/// then driver activity for system drivers. Manual assignments also emit a
/// driver notification and a work order; neither is part of the assignment.
pub async fn assign(
    reservation: &Reservation,
    choice: AssignmentChoice,
    drivers: &dyn DriverDirectory,
    now: DateTime<Utc>,
) -> AppResult<AssignmentOutcome> {
    if !reservation.status.accepts_assignment() {
        return Err(AppError::InvalidState(format!(
            "reservation {} is {} and cannot be assigned",
            reservation.reservation_code,
            reservation.status.as_str()
        )));
    }

    let assignment = match choice {
        AssignmentChoice::System { driver_id, vehicle_id } => {
            if !drivers.is_driver_active(driver_id).await? {
                return Err(AppError::NoActiveDriver(driver_id));
            }
            Assignment::System { driver_id, vehicle_id }
        }
        AssignmentChoice::Manual {
            driver_name,
            driver_phone,
            plate_number,
            agreed_price,
        } => manual_assignment(driver_name, driver_phone, plate_number, agreed_price)?,
    };

    let mut updated = reservation.clone();
    updated.assignment = Some(assignment);
    updated.status = ReservationStatus::Assigned;
    updated.updated_at = now;

    let side_effects = side_effects_for(&updated, now);

    Ok(AssignmentOutcome {
        reservation: updated,
        side_effects,
    })
}

fn manual_assignment(
    driver_name: Option<String>,
    driver_phone: Option<String>,
    plate_number: Option<String>,
    agreed_price: Option<f64>,
) -> AppResult<Assignment> {
    fn present(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    let driver_name = present(driver_name);
    let driver_phone = present(driver_phone);
    let plate_number = present(plate_number);
    let agreed_price = agreed_price.filter(|p| p.is_finite() && *p > 0.0);

    let mut missing = Vec::new();
    if driver_name.is_none() {
        missing.push("driver_name".to_string());
    }
    if driver_phone.is_none() {
        missing.push("driver_phone".to_string());
    }
    if plate_number.is_none() {
        missing.push("plate_number".to_string());
    }
    if agreed_price.is_none() {
        missing.push("agreed_price".to_string());
    }

    match (driver_name, driver_phone, plate_number, agreed_price) {
        (Some(driver_name), Some(driver_phone), Some(plate_number), Some(agreed_price)) => {
            Ok(Assignment::Manual {
                driver_name,
                driver_phone,
                plate_number,
                agreed_price,
            })
        }
        _ => Err(AppError::IncompleteManualDriver(missing)),
    }
}

fn side_effects_for(reservation: &Reservation, now: DateTime<Utc>) -> Vec<SideEffect> {
    let Some(Assignment::Manual {
        driver_name,
        driver_phone,
        plate_number,
        agreed_price,
    }) = &reservation.assignment
    else {
        return Vec::new();
    };

    let work_order = WorkOrder {
        reservation_code: reservation.reservation_code.clone(),
        customer_name: reservation.customer.full_name(),
        customer_phone: reservation.customer.phone.clone(),
        pickup_location: reservation.trip.pickup_location.clone(),
        dropoff_location: reservation.trip.dropoff_location.clone(),
        date: reservation.trip.date,
        time: reservation.trip.time,
        return_date: reservation.trip.return_date,
        return_time: reservation.trip.return_time,
        passenger_count: reservation.trip.passenger_count,
        luggage_count: reservation.trip.luggage_count,
        driver_name: driver_name.clone(),
        driver_phone: driver_phone.clone(),
        plate_number: plate_number.clone(),
        agreed_price: *agreed_price,
        issued_at: now,
    };

    vec![
        SideEffect::NotifyDriver {
            phone: driver_phone.clone(),
            message: DriverMessage::new(reservation, driver_name, *agreed_price),
        },
        SideEffect::PrintWorkOrder(work_order),
    ]
}
