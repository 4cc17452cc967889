use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::collaborators::DriverDirectory;
use crate::entities::driver;
use crate::error::AppResult;

#[derive(Clone)]
pub struct SeaOrmDriverDirectory {
    db: DatabaseConnection,
}

impl SeaOrmDriverDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DriverDirectory for SeaOrmDriverDirectory {
    async fn is_driver_active(&self, driver_id: Uuid) -> AppResult<bool> {
        let driver = driver::Entity::find_by_id(driver_id).one(&self.db).await?;
        Ok(driver.is_some_and(|d| d.active))
    }
}
