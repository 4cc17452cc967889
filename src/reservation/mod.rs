pub mod assignment;
pub mod lifecycle;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::reservation as reservation_entity;
use crate::error::{AppError, AppResult};

pub use crate::entities::reservation::{PaymentMethod, ReservationStatus};
pub use assignment::{assign, AssignmentChoice, AssignmentOutcome, SideEffect};
pub use lifecycle::{ensure_deletable, transition, Transition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl Customer {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.first_name.trim().is_empty() {
            problems.push("customer first_name is required".to_string());
        }
        if self.last_name.trim().is_empty() {
            problems.push("customer last_name is required".to_string());
        }
        if self.phone.trim().is_empty() {
            problems.push("customer phone is required".to_string());
        }
        problems
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub pickup_location: String,
    pub dropoff_location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub passenger_count: i32,
    #[serde(default)]
    pub luggage_count: i32,
    #[serde(default)]
    pub round_trip: bool,
    pub return_date: Option<NaiveDate>,
    pub return_time: Option<NaiveTime>,
}

impl Trip {
    /// Drop return leg data on one-way trips.
    fn normalized(mut self) -> Self {
        if !self.round_trip {
            self.return_date = None;
            self.return_time = None;
        }
        self
    }

    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.pickup_location.trim().is_empty() {
            problems.push("pickup_location is required".to_string());
        }
        if self.dropoff_location.trim().is_empty() {
            problems.push("dropoff_location is required".to_string());
        }
        if self.passenger_count < 1 {
            problems.push("passenger_count must be at least 1".to_string());
        }
        if self.luggage_count < 0 {
            problems.push("luggage_count cannot be negative".to_string());
        }
        if self.round_trip {
            match (self.return_date, self.return_time) {
                (Some(date), Some(time)) => {
                    if date.and_time(time) < self.date.and_time(self.time) {
                        problems.push("return must not be before the outbound trip".to_string());
                    }
                }
                _ => problems.push("round trips need return_date and return_time".to_string()),
            }
        }
        problems
    }
}

/// Who drives the trip. A reservation holds at most one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Assignment {
    System {
        driver_id: Uuid,
        vehicle_id: Uuid,
    },
    Manual {
        driver_name: String,
        driver_phone: String,
        plate_number: String,
        agreed_price: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    pub reason: String,
    pub by: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub reservation_code: String,
    pub customer: Customer,
    pub trip: Trip,
    pub total_price: f64,
    pub payment_method: PaymentMethod,
    pub assignment: Option<Assignment>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancellation: Option<Cancellation>,
    pub version: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    pub customer: Customer,
    pub trip: Trip,
    pub payment_method: PaymentMethod,
}

/// Status-preserving corrections made by staff.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationEdit {
    pub customer: Option<Customer>,
    pub trip: Option<Trip>,
    pub total_price: Option<f64>,
    pub payment_method: Option<PaymentMethod>,
}

impl Reservation {
    /// Build a fresh `pending` reservation. `total_price` comes from the fare API.
    pub fn create(
        new: NewReservation,
        reservation_code: String,
        total_price: f64,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let trip = new.trip.normalized();

        let mut problems = new.customer.problems();
        problems.extend(trip.problems());
        if !(total_price.is_finite() && total_price >= 0.0) {
            problems.push("total_price must be a non-negative number".to_string());
        }
        if !problems.is_empty() {
            return Err(AppError::Validation(problems));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            reservation_code,
            customer: new.customer,
            trip,
            total_price,
            payment_method: new.payment_method,
            assignment: None,
            status: ReservationStatus::Pending,
            created_at: now,
            updated_at: now,
            cancellation: None,
            version: 0,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a correction without touching status or assignment.
    ///
    /// Cancelled reservations only accept customer contact corrections.
    /// Completed reservations are already billed, so their price and payment
    /// method are fixed.
    pub fn apply_edit(&self, edit: ReservationEdit, now: DateTime<Utc>) -> AppResult<Self> {
        if self.status == ReservationStatus::Cancelled
            && (edit.trip.is_some() || edit.total_price.is_some() || edit.payment_method.is_some())
        {
            return Err(AppError::InvalidState(format!(
                "reservation {} is cancelled; only customer details can be corrected",
                self.reservation_code
            )));
        }
        if self.status == ReservationStatus::Completed
            && (edit.total_price.is_some() || edit.payment_method.is_some())
        {
            return Err(AppError::InvalidState(format!(
                "reservation {} is completed and billed; price and payment method are fixed",
                self.reservation_code
            )));
        }

        let mut updated = self.clone();
        let mut problems = Vec::new();

        if let Some(customer) = edit.customer {
            problems.extend(customer.problems());
            updated.customer = customer;
        }
        if let Some(trip) = edit.trip {
            let trip = trip.normalized();
            problems.extend(trip.problems());
            updated.trip = trip;
        }
        if let Some(total_price) = edit.total_price {
            if !(total_price.is_finite() && total_price >= 0.0) {
                problems.push("total_price must be a non-negative number".to_string());
            }
            updated.total_price = total_price;
        }
        if let Some(method) = edit.payment_method {
            updated.payment_method = method;
        }

        if !problems.is_empty() {
            return Err(AppError::Validation(problems));
        }

        updated.updated_at = now;
        Ok(updated)
    }
}

impl TryFrom<reservation_entity::Model> for Reservation {
    type Error = AppError;

    fn try_from(m: reservation_entity::Model) -> AppResult<Self> {
        let assignment = match (
            m.driver_id,
            m.vehicle_id,
            m.manual_driver_name,
            m.manual_driver_phone,
            m.manual_plate_number,
            m.manual_agreed_price,
        ) {
            (None, None, None, None, None, None) => None,
            (Some(driver_id), Some(vehicle_id), None, None, None, None) => {
                Some(Assignment::System { driver_id, vehicle_id })
            }
            (None, None, Some(driver_name), Some(driver_phone), Some(plate_number), Some(agreed_price)) => {
                Some(Assignment::Manual {
                    driver_name,
                    driver_phone,
                    plate_number,
                    agreed_price,
                })
            }
            _ => {
                return Err(AppError::Internal(format!(
                    "reservation {} has inconsistent assignment columns",
                    m.id
                )));
            }
        };

        let cancellation = match (m.cancellation_reason, m.cancelled_by, m.cancelled_at) {
            (Some(reason), Some(by), Some(at)) => Some(Cancellation {
                reason,
                by,
                at: at.with_timezone(&Utc),
            }),
            _ => None,
        };

        Ok(Self {
            id: m.id,
            reservation_code: m.reservation_code,
            customer: Customer {
                first_name: m.customer_first_name,
                last_name: m.customer_last_name,
                phone: m.customer_phone,
                email: m.customer_email,
            },
            trip: Trip {
                pickup_location: m.pickup_location,
                dropoff_location: m.dropoff_location,
                date: m.trip_date,
                time: m.trip_time,
                passenger_count: m.passenger_count,
                luggage_count: m.luggage_count,
                round_trip: m.round_trip,
                return_date: m.return_date,
                return_time: m.return_time,
            },
            total_price: m.total_price,
            payment_method: m.payment_method,
            assignment,
            status: m.status,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
            cancellation,
            version: m.version,
        })
    }
}

impl From<&Reservation> for reservation_entity::Model {
    fn from(r: &Reservation) -> Self {
        let (driver_id, vehicle_id) = match &r.assignment {
            Some(Assignment::System { driver_id, vehicle_id }) => (Some(*driver_id), Some(*vehicle_id)),
            _ => (None, None),
        };
        let (manual_driver_name, manual_driver_phone, manual_plate_number, manual_agreed_price) =
            match &r.assignment {
                Some(Assignment::Manual {
                    driver_name,
                    driver_phone,
                    plate_number,
                    agreed_price,
                }) => (
                    Some(driver_name.clone()),
                    Some(driver_phone.clone()),
                    Some(plate_number.clone()),
                    Some(*agreed_price),
                ),
                _ => (None, None, None, None),
            };

        Self {
            id: r.id,
            reservation_code: r.reservation_code.clone(),
            customer_first_name: r.customer.first_name.clone(),
            customer_last_name: r.customer.last_name.clone(),
            customer_phone: r.customer.phone.clone(),
            customer_email: r.customer.email.clone(),
            pickup_location: r.trip.pickup_location.clone(),
            dropoff_location: r.trip.dropoff_location.clone(),
            trip_date: r.trip.date,
            trip_time: r.trip.time,
            passenger_count: r.trip.passenger_count,
            luggage_count: r.trip.luggage_count,
            round_trip: r.trip.round_trip,
            return_date: r.trip.return_date,
            return_time: r.trip.return_time,
            total_price: r.total_price,
            payment_method: r.payment_method,
            status: r.status,
            driver_id,
            vehicle_id,
            manual_driver_name,
            manual_driver_phone,
            manual_plate_number,
            manual_agreed_price,
            cancellation_reason: r.cancellation.as_ref().map(|c| c.reason.clone()),
            cancelled_by: r.cancellation.as_ref().map(|c| c.by.clone()),
            cancelled_at: r.cancellation.as_ref().map(|c| c.at.into()),
            version: r.version,
            created_at: r.created_at.into(),
            updated_at: r.updated_at.into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
    }

    pub fn customer() -> Customer {
        Customer {
            first_name: "Marta".to_string(),
            last_name: "Vidal".to_string(),
            phone: "+34600111222".to_string(),
            email: "marta@example.com".to_string(),
        }
    }

    pub fn trip() -> Trip {
        Trip {
            pickup_location: "Airport T1".to_string(),
            dropoff_location: "Hotel Miramar".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            time: NaiveTime::from_hms_opt(14, 15, 0).unwrap(),
            passenger_count: 3,
            luggage_count: 2,
            round_trip: false,
            return_date: None,
            return_time: None,
        }
    }

    pub fn new_reservation(payment_method: PaymentMethod) -> NewReservation {
        NewReservation {
            customer: customer(),
            trip: trip(),
            payment_method,
        }
    }

    pub fn pending(payment_method: PaymentMethod) -> Reservation {
        Reservation::create(new_reservation(payment_method), "TRF-TEST1".to_string(), 33.0, now()).unwrap()
    }

    pub fn manual() -> Assignment {
        Assignment::Manual {
            driver_name: "Jordi".to_string(),
            driver_phone: "+34600999888".to_string(),
            plate_number: "1234-BCD".to_string(),
            agreed_price: 25.0,
        }
    }
}
