use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260301_000003_create_reservations::{PaymentMethod, Reservation};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(LedgerEntryKind::Enum)
                    .values([LedgerEntryKind::CommissionDebt, LedgerEntryKind::Receivable])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerEntry::Table)
                    .if_not_exists()
                    .col(uuid(LedgerEntry::Id).primary_key())
                    // One entry per completed reservation
                    .col(uuid(LedgerEntry::ReservationId).not_null().unique_key())
                    .col(
                        ColumnDef::new(LedgerEntry::Kind)
                            .custom(LedgerEntryKind::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntry::PaymentMethod)
                            .custom(PaymentMethod::Enum)
                            .not_null(),
                    )
                    .col(double(LedgerEntry::Amount).not_null())
                    .col(
                        timestamp_with_time_zone(LedgerEntry::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entry_reservation")
                            .from(LedgerEntry::Table, LedgerEntry::ReservationId)
                            .to(Reservation::Table, Reservation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LedgerEntry::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(LedgerEntryKind::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LedgerEntry {
    Table,
    Id,
    ReservationId,
    Kind,
    PaymentMethod,
    Amount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LedgerEntryKind {
    #[sea_orm(iden = "ledger_entry_kind")]
    Enum,
    #[sea_orm(iden = "commission_debt")]
    CommissionDebt,
    #[sea_orm(iden = "receivable")]
    Receivable,
}
