use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::driver;
use crate::error::{AppError, AppResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// List all drivers (admin)
pub async fn list_drivers(State(state): State<AppState>) -> AppResult<Json<Vec<driver::Model>>> {
    let drivers = driver::Entity::find()
        .order_by_asc(driver::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(drivers))
}

/// Register a driver in the directory (admin)
pub async fn create_driver(
    State(state): State<AppState>,
    Json(payload): Json<CreateDriverRequest>,
) -> AppResult<Json<driver::Model>> {
    let mut problems = Vec::new();
    if payload.name.trim().is_empty() {
        problems.push("name is required".to_string());
    }
    if payload.phone.trim().is_empty() {
        problems.push("phone is required".to_string());
    }
    if !problems.is_empty() {
        return Err(AppError::Validation(problems));
    }

    let driver = driver::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        phone: Set(payload.phone.trim().to_string()),
        active: Set(true),
        created_at: Set(Utc::now().into()),
    };

    let result = driver.insert(&state.db).await?;
    tracing::info!(driver_id = %result.id, "Driver registered");

    Ok(Json(result))
}

/// Activate or deactivate a driver (admin)
///
/// Inactive drivers keep their existing assignments but cannot be picked
/// for new ones.
pub async fn set_driver_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> AppResult<Json<driver::Model>> {
    let driver = driver::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver not found".to_string()))?;

    let mut active: driver::ActiveModel = driver.into();
    active.active = Set(payload.active);

    let result = active.update(&state.db).await?;
    tracing::info!(driver_id = %result.id, active = result.active, "Driver status changed");

    Ok(Json(result))
}
