use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::reservation::PaymentMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ledger_entry_kind")]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    /// Driver collected cash and owes the commission.
    #[sea_orm(string_value = "commission_debt")]
    CommissionDebt,
    /// Customer paid the company; the driver is owed their share.
    #[sea_orm(string_value = "receivable")]
    Receivable,
}

impl LedgerEntryKind {
    pub fn for_payment(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => LedgerEntryKind::CommissionDebt,
            PaymentMethod::Card | PaymentMethod::BankTransfer => LedgerEntryKind::Receivable,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entry")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub reservation_id: Uuid,
    pub kind: LedgerEntryKind,
    pub payment_method: PaymentMethod,
    pub amount: f64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reservation::Entity",
        from = "Column::ReservationId",
        to = "super::reservation::Column::Id"
    )]
    Reservation,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
