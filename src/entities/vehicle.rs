use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::pricing::{PricingTable, VehiclePricing};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub pricing_table: Option<Json>,
    pub legacy_rate_per_km: Option<f64>,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn pricing_table(&self) -> AppResult<Option<PricingTable>> {
        self.pricing_table
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| {
                AppError::Internal(format!("Stored pricing table for vehicle {} is unreadable: {}", self.id, e))
            })
    }

    pub fn pricing(&self) -> AppResult<VehiclePricing> {
        Ok(VehiclePricing {
            pricing_table: self.pricing_table()?,
            legacy_rate_per_km: self.legacy_rate_per_km,
        })
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
