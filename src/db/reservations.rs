use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    NotSet, QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use crate::collaborators::ReservationStore;
use crate::entities::reservation;
use crate::error::{AppError, AppResult};
use crate::reservation::Reservation;

#[derive(Clone)]
pub struct SeaOrmReservationStore {
    db: DatabaseConnection,
}

impl SeaOrmReservationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(reservation::Entity::find_by_id(id).one(&self.db).await?.is_some())
    }
}

fn map_unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            AppError::Conflict(format!("Reservation already exists: {}", detail))
        }
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl ReservationStore for SeaOrmReservationStore {
    async fn load(&self, id: Uuid) -> AppResult<Reservation> {
        let row = reservation::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation not found".to_string()))?;
        Reservation::try_from(row)
    }

    async fn list(&self) -> AppResult<Vec<Reservation>> {
        reservation::Entity::find()
            .order_by_desc(reservation::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Reservation::try_from)
            .collect()
    }

    async fn insert(&self, r: &Reservation) -> AppResult<Reservation> {
        let active = reservation::Model::from(r).into_active_model().reset_all();
        let row = active.insert(&self.db).await.map_err(map_unique_violation)?;
        Reservation::try_from(row)
    }

    async fn save(&self, r: &Reservation, expected_version: i32) -> AppResult<Reservation> {
        let mut row = reservation::Model::from(r);
        row.version = expected_version + 1;

        // Every column is rewritten; the version filter turns this into a
        // compare-and-swap on the stored row.
        let mut active = row.clone().into_active_model().reset_all();
        active.id = NotSet;

        let result = reservation::Entity::update_many()
            .set(active)
            .filter(reservation::Column::Id.eq(r.id))
            .filter(reservation::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            if !self.exists(r.id).await? {
                return Err(AppError::NotFound("Reservation not found".to_string()));
            }
            tracing::warn!(
                reservation_code = %r.reservation_code,
                expected_version,
                "Stale reservation write rejected"
            );
            return Err(AppError::Conflict(format!(
                "reservation {} was modified concurrently; reload and retry",
                r.reservation_code
            )));
        }

        Reservation::try_from(row)
    }

    async fn delete(&self, id: Uuid, expected_version: i32) -> AppResult<()> {
        let result = reservation::Entity::delete_many()
            .filter(reservation::Column::Id.eq(id))
            .filter(reservation::Column::Version.eq(expected_version))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            if !self.exists(id).await? {
                return Err(AppError::NotFound("Reservation not found".to_string()));
            }
            return Err(AppError::Conflict(
                "reservation was modified concurrently; reload and retry".to_string(),
            ));
        }

        Ok(())
    }
}
