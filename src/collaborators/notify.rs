use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::{Notifier, WorkOrderSink};
use crate::error::{AppError, AppResult};
use crate::reservation::Reservation;

/// Template data for the message sent to an externally sourced driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverMessage {
    pub driver_name: String,
    pub reservation_code: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub passenger_count: i32,
    pub luggage_count: i32,
    pub round_trip: bool,
    pub agreed_price: f64,
}

impl DriverMessage {
    pub fn new(reservation: &Reservation, driver_name: &str, agreed_price: f64) -> Self {
        Self {
            driver_name: driver_name.to_string(),
            reservation_code: reservation.reservation_code.clone(),
            pickup_location: reservation.trip.pickup_location.clone(),
            dropoff_location: reservation.trip.dropoff_location.clone(),
            date: reservation.trip.date,
            time: reservation.trip.time,
            passenger_count: reservation.trip.passenger_count,
            luggage_count: reservation.trip.luggage_count,
            round_trip: reservation.trip.round_trip,
            agreed_price,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "Hello {}, you have a new transfer {}.\nPickup: {}\nDropoff: {}\nDate: {} {}\nPassengers: {}, luggage: {}{}\nAgreed price: {:.2} EUR",
            self.driver_name,
            self.reservation_code,
            self.pickup_location,
            self.dropoff_location,
            self.date.format("%d/%m/%Y"),
            self.time.format("%H:%M"),
            self.passenger_count,
            self.luggage_count,
            if self.round_trip { "\nRound trip" } else { "" },
            self.agreed_price,
        )
    }
}

/// Printable work order handed to a manual driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkOrder {
    pub reservation_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub return_date: Option<NaiveDate>,
    pub return_time: Option<NaiveTime>,
    pub passenger_count: i32,
    pub luggage_count: i32,
    pub driver_name: String,
    pub driver_phone: String,
    pub plate_number: String,
    pub agreed_price: f64,
    pub issued_at: DateTime<Utc>,
}

impl WorkOrder {
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("WORK ORDER {}", self.reservation_code),
            format!("Issued: {}", self.issued_at.format("%d/%m/%Y %H:%M")),
            format!("Customer: {} ({})", self.customer_name, self.customer_phone),
            format!("Pickup: {}", self.pickup_location),
            format!("Dropoff: {}", self.dropoff_location),
            format!("Date: {} {}", self.date.format("%d/%m/%Y"), self.time.format("%H:%M")),
        ];
        if let (Some(date), Some(time)) = (self.return_date, self.return_time) {
            lines.push(format!("Return: {} {}", date.format("%d/%m/%Y"), time.format("%H:%M")));
        }
        lines.push(format!(
            "Passengers: {}, luggage: {}",
            self.passenger_count, self.luggage_count
        ));
        lines.push(format!(
            "Driver: {} ({}), plate {}",
            self.driver_name, self.driver_phone, self.plate_number
        ));
        lines.push(format!("Agreed price: {:.2} EUR", self.agreed_price));
        lines.join("\n")
    }
}

/// Posts driver messages as JSON to an outbound messaging gateway.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    phone: &'a str,
    message: String,
    reservation_code: &'a str,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify_driver(&self, phone: &str, message: &DriverMessage) -> AppResult<()> {
        let payload = WebhookPayload {
            phone,
            message: message.render(),
            reservation_code: &message.reservation_code,
        };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::ExternalCollaborator(format!("notification webhook: {}", e)))?;

        tracing::info!(
            reservation_code = %message.reservation_code,
            "Driver notification delivered"
        );
        Ok(())
    }
}

/// Used when no messaging gateway is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_driver(&self, phone: &str, message: &DriverMessage) -> AppResult<()> {
        tracing::info!(
            phone,
            reservation_code = %message.reservation_code,
            message = %message.render(),
            "Driver notification (no gateway configured)"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogWorkOrderSink;

#[async_trait]
impl WorkOrderSink for LogWorkOrderSink {
    async fn publish(&self, order: &WorkOrder) -> AppResult<()> {
        tracing::info!(
            reservation_code = %order.reservation_code,
            work_order = %order.render(),
            "Work order issued"
        );
        Ok(())
    }
}
