use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260301_000001_create_vehicles::Vehicle;
use super::m20260301_000002_create_drivers::Driver;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(ReservationStatus::Enum)
                    .values([
                        ReservationStatus::Pending,
                        ReservationStatus::Confirmed,
                        ReservationStatus::Assigned,
                        ReservationStatus::InProgress,
                        ReservationStatus::Completed,
                        ReservationStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(PaymentMethod::Enum)
                    .values([
                        PaymentMethod::Cash,
                        PaymentMethod::Card,
                        PaymentMethod::BankTransfer,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reservation::Table)
                    .if_not_exists()
                    .col(uuid(Reservation::Id).primary_key())
                    .col(string_len(Reservation::ReservationCode, 32).not_null().unique_key())
                    // Customer
                    .col(string_len(Reservation::CustomerFirstName, 100).not_null())
                    .col(string_len(Reservation::CustomerLastName, 100).not_null())
                    .col(string_len(Reservation::CustomerPhone, 32).not_null())
                    .col(string_len(Reservation::CustomerEmail, 255).not_null())
                    // Trip
                    .col(string(Reservation::PickupLocation).not_null())
                    .col(string(Reservation::DropoffLocation).not_null())
                    .col(date(Reservation::TripDate).not_null())
                    .col(time(Reservation::TripTime).not_null())
                    .col(integer(Reservation::PassengerCount).not_null())
                    .col(integer(Reservation::LuggageCount).not_null().default(0))
                    .col(boolean(Reservation::RoundTrip).not_null().default(false))
                    .col(date_null(Reservation::ReturnDate))
                    .col(time_null(Reservation::ReturnTime))
                    // Money and status
                    .col(double(Reservation::TotalPrice).not_null())
                    .col(
                        ColumnDef::new(Reservation::PaymentMethod)
                            .custom(PaymentMethod::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservation::Status)
                            .custom(ReservationStatus::Enum)
                            .not_null(),
                    )
                    // System assignment
                    .col(uuid_null(Reservation::DriverId))
                    .col(uuid_null(Reservation::VehicleId))
                    // Manual assignment
                    .col(string_len_null(Reservation::ManualDriverName, 100))
                    .col(string_len_null(Reservation::ManualDriverPhone, 32))
                    .col(string_len_null(Reservation::ManualPlateNumber, 20))
                    .col(double_null(Reservation::ManualAgreedPrice))
                    // Cancellation
                    .col(text_null(Reservation::CancellationReason))
                    .col(string_len_null(Reservation::CancelledBy, 100))
                    .col(timestamp_with_time_zone_null(Reservation::CancelledAt))
                    .col(integer(Reservation::Version).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(Reservation::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Reservation::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_driver")
                            .from(Reservation::Table, Reservation::DriverId)
                            .to(Driver::Table, Driver::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservation_vehicle")
                            .from(Reservation::Table, Reservation::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservation_status")
                    .table(Reservation::Table)
                    .col(Reservation::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservation::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PaymentMethod::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ReservationStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Reservation {
    Table,
    Id,
    ReservationCode,
    CustomerFirstName,
    CustomerLastName,
    CustomerPhone,
    CustomerEmail,
    PickupLocation,
    DropoffLocation,
    TripDate,
    TripTime,
    PassengerCount,
    LuggageCount,
    RoundTrip,
    ReturnDate,
    ReturnTime,
    TotalPrice,
    PaymentMethod,
    Status,
    DriverId,
    VehicleId,
    ManualDriverName,
    ManualDriverPhone,
    ManualPlateNumber,
    ManualAgreedPrice,
    CancellationReason,
    CancelledBy,
    CancelledAt,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum ReservationStatus {
    #[sea_orm(iden = "reservation_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "confirmed")]
    Confirmed,
    #[sea_orm(iden = "assigned")]
    Assigned,
    #[sea_orm(iden = "in_progress")]
    InProgress,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
}

#[derive(DeriveIden)]
pub enum PaymentMethod {
    #[sea_orm(iden = "payment_method")]
    Enum,
    #[sea_orm(iden = "cash")]
    Cash,
    #[sea_orm(iden = "card")]
    Card,
    #[sea_orm(iden = "bank_transfer")]
    BankTransfer,
}
