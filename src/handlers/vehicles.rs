use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{reservation, vehicle};
use crate::error::{AppError, AppResult};
use crate::pricing::PricingTable;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub name: String,
    pub capacity: i32,
    pub pricing_table: Option<PricingTable>,
    pub legacy_rate_per_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVehicleRequest {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub pricing_table: Option<PricingTable>,
    pub legacy_rate_per_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub pricing_table: Option<PricingTable>,
    pub legacy_rate_per_km: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<vehicle::Model> for VehicleResponse {
    type Error = AppError;

    fn try_from(v: vehicle::Model) -> AppResult<Self> {
        Ok(Self {
            pricing_table: v.pricing_table()?,
            id: v.id,
            name: v.name,
            capacity: v.capacity,
            legacy_rate_per_km: v.legacy_rate_per_km,
            created_at: v.created_at.with_timezone(&Utc),
        })
    }
}

/// Reject tables the fare calculator cannot price, and unusable legacy rates
fn check_pricing(table: Option<&PricingTable>, legacy_rate_per_km: Option<f64>) -> AppResult<()> {
    if let Some(table) = table {
        let validation = table.validate();
        if !validation.valid {
            return Err(AppError::Validation(validation.errors));
        }
    }

    if let Some(rate) = legacy_rate_per_km {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(AppError::validation("legacy_rate_per_km must be greater than zero"));
        }
    }

    Ok(())
}

fn check_capacity(capacity: i32) -> AppResult<()> {
    if capacity < 1 {
        return Err(AppError::validation("capacity must be at least 1"));
    }
    Ok(())
}

fn to_json(table: &PricingTable) -> AppResult<serde_json::Value> {
    serde_json::to_value(table)
        .map_err(|e| AppError::Internal(format!("Failed to encode pricing table: {}", e)))
}

/// List all vehicles (admin)
pub async fn list_vehicles(State(state): State<AppState>) -> AppResult<Json<Vec<VehicleResponse>>> {
    let vehicles = vehicle::Entity::find()
        .order_by_asc(vehicle::Column::Name)
        .all(&state.db)
        .await?;

    let responses = vehicles
        .into_iter()
        .map(VehicleResponse::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(responses))
}

/// Create a vehicle (admin)
pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<VehicleResponse>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("name is required"));
    }
    check_capacity(payload.capacity)?;
    check_pricing(payload.pricing_table.as_ref(), payload.legacy_rate_per_km)?;

    if payload.pricing_table.is_none() && payload.legacy_rate_per_km.is_none() {
        return Err(AppError::validation(
            "a vehicle needs a pricing_table or a legacy_rate_per_km",
        ));
    }

    let pricing_table = payload.pricing_table.as_ref().map(to_json).transpose()?;

    let vehicle = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        capacity: Set(payload.capacity),
        pricing_table: Set(pricing_table),
        legacy_rate_per_km: Set(payload.legacy_rate_per_km),
        created_at: Set(Utc::now().into()),
    };

    let result = vehicle.insert(&state.db).await?;
    tracing::info!(vehicle_id = %result.id, name = %result.name, "Vehicle created");

    Ok(Json(VehicleResponse::try_from(result)?))
}

/// Update a vehicle (admin)
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<VehicleResponse>> {
    let vehicle = vehicle::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    check_pricing(payload.pricing_table.as_ref(), payload.legacy_rate_per_km)?;

    let mut active: vehicle::ActiveModel = vehicle.into();

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::validation("name is required"));
        }
        active.name = Set(name.trim().to_string());
    }

    if let Some(capacity) = payload.capacity {
        check_capacity(capacity)?;
        active.capacity = Set(capacity);
    }

    if let Some(table) = &payload.pricing_table {
        active.pricing_table = Set(Some(to_json(table)?));
    }

    if let Some(rate) = payload.legacy_rate_per_km {
        active.legacy_rate_per_km = Set(Some(rate));
    }

    let result = active.update(&state.db).await?;
    Ok(Json(VehicleResponse::try_from(result)?))
}

/// Vehicles referenced by a reservation keep their row so the assignment
/// stays readable.
fn ensure_unreferenced(vehicle_id: Uuid, reservations: u64) -> AppResult<()> {
    if reservations > 0 {
        return Err(AppError::Conflict(format!(
            "vehicle {} is assigned to {} reservation(s)",
            vehicle_id, reservations
        )));
    }
    Ok(())
}

/// Delete a vehicle that no reservation refers to (admin)
pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let references = reservation::Entity::find()
        .filter(reservation::Column::VehicleId.eq(id))
        .count(&state.db)
        .await?;
    ensure_unreferenced(id, references)?;

    // An assignment made after the count still trips the foreign key
    let result = vehicle::Entity::delete_by_id(id)
        .exec(&state.db)
        .await
        .map_err(|err| match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::Conflict(format!("vehicle {} is assigned to a reservation", id))
            }
            _ => AppError::Database(err),
        })?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Vehicle not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Vehicle deleted" })))
}
