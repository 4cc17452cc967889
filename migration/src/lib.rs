pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_vehicles;
mod m20260301_000002_create_drivers;
mod m20260301_000003_create_reservations;
mod m20260301_000004_create_ledger_entries;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_vehicles::Migration),
            Box::new(m20260301_000002_create_drivers::Migration),
            Box::new(m20260301_000003_create_reservations::Migration),
            Box::new(m20260301_000004_create_ledger_entries::Migration),
        ]
    }
}
