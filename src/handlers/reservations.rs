use axum::{
    extract::{Path, State},
    Json,
};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::vehicle;
use crate::error::{AppError, AppResult};
use crate::pricing::{quote_vehicle, FareRequest, FareResult};
use crate::reservation::{
    Assignment, AssignmentChoice, Customer, NewReservation, PaymentMethod, Reservation, ReservationEdit,
    Transition, Trip,
};
use crate::services::AssignmentReport;
use crate::AppState;

// ============ Booking ============

fn ensure_seats(vehicle: &vehicle::Model, passenger_count: i32) -> AppResult<()> {
    if passenger_count > vehicle.capacity {
        return Err(AppError::validation(format!(
            "{} seats only {} passengers",
            vehicle.name, vehicle.capacity
        )));
    }
    Ok(())
}

async fn find_vehicle(state: &AppState, id: Uuid) -> AppResult<vehicle::Model> {
    vehicle::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub customer: Customer,
    pub trip: Trip,
    pub payment_method: PaymentMethod,
    pub vehicle_id: Uuid,
    pub one_way_distance_km: f64,
}

#[derive(Debug, Serialize)]
pub struct CreatedReservationResponse {
    pub reservation: Reservation,
    pub fare: FareResult,
}

/// Book a transfer; the price always comes from the fare calculator
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<Json<CreatedReservationResponse>> {
    let vehicle = find_vehicle(&state, payload.vehicle_id).await?;
    ensure_seats(&vehicle, payload.trip.passenger_count)?;

    let request = FareRequest {
        one_way_distance_km: payload.one_way_distance_km,
        round_trip: payload.trip.round_trip,
    };
    let fare = quote_vehicle(&request, &vehicle.pricing()?)?;

    let new = NewReservation {
        customer: payload.customer,
        trip: payload.trip,
        payment_method: payload.payment_method,
    };
    let reservation = state
        .reservations
        .create(new, fare.total_amount as f64)
        .await?;

    Ok(Json(CreatedReservationResponse { reservation, fare }))
}

// ============ Reservation Management (Admin) ============

/// List all reservations, newest first (admin)
pub async fn list_reservations(State(state): State<AppState>) -> AppResult<Json<Vec<Reservation>>> {
    Ok(Json(state.reservations.list().await?))
}

/// Get one reservation (admin)
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(state.reservations.get(id).await?))
}

/// Correct customer, trip or price data without changing status (admin)
pub async fn update_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReservationEdit>,
) -> AppResult<Json<Reservation>> {
    if let Some(trip) = &payload.trip {
        let current = state.reservations.get(id).await?;
        if let Some(Assignment::System { vehicle_id, .. }) = current.assignment {
            let vehicle = find_vehicle(&state, vehicle_id).await?;
            ensure_seats(&vehicle, trip.passenger_count)?;
        }
    }

    Ok(Json(state.reservations.edit(id, payload).await?))
}

/// Delete a reservation that never got a driver (admin)
pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state.reservations.delete(id).await?;
    Ok(Json(serde_json::json!({ "message": "Reservation deleted" })))
}

/// Assign a system driver and vehicle, or an external driver (admin)
pub async fn assign_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignmentChoice>,
) -> AppResult<Json<AssignmentReport>> {
    if let AssignmentChoice::System { vehicle_id, .. } = &payload {
        let vehicle = find_vehicle(&state, *vehicle_id).await?;
        let current = state.reservations.get(id).await?;
        ensure_seats(&vehicle, current.trip.passenger_count)?;
    }

    Ok(Json(state.reservations.assign(id, payload).await?))
}

/// Confirm a pending reservation (admin)
pub async fn confirm_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(state.reservations.transition(id, Transition::Confirm).await?))
}

/// Mark the trip as under way (admin)
pub async fn start_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(state.reservations.transition(id, Transition::Start).await?))
}

/// Complete the trip and book it in the ledger (admin)
pub async fn complete_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    Ok(Json(state.reservations.complete(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
    pub by: String,
}

/// Cancel a reservation (admin)
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelRequest>,
) -> AppResult<Json<Reservation>> {
    let transition = Transition::Cancel {
        reason: payload.reason,
        by: payload.by,
    };
    Ok(Json(state.reservations.transition(id, transition).await?))
}
