use axum::{extract::State, Json};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::vehicle;
use crate::error::{AppError, AppResult};
use crate::pricing::{quote_vehicle, validate_pricing_table, FareRequest, FareResult, PriceRange, TableValidation};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub vehicle_id: Uuid,
    pub one_way_distance_km: f64,
    #[serde(default)]
    pub round_trip: bool,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub total_distance_km: f64,
    pub fare: FareResult,
}

/// Price a trip for one vehicle
pub async fn quote(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> AppResult<Json<QuoteResponse>> {
    let vehicle = vehicle::Entity::find_by_id(payload.vehicle_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    let request = FareRequest {
        one_way_distance_km: payload.one_way_distance_km,
        round_trip: payload.round_trip,
    };
    let fare = quote_vehicle(&request, &vehicle.pricing()?)?;

    Ok(Json(QuoteResponse {
        vehicle_id: vehicle.id,
        vehicle_name: vehicle.name,
        total_distance_km: request.total_distance_km(),
        fare,
    }))
}

/// Check a pricing table without saving it (admin)
pub async fn validate_table(Json(ranges): Json<Vec<PriceRange>>) -> Json<TableValidation> {
    Json(validate_pricing_table(&ranges))
}
