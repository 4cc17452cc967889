use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set, SqlErr};
use uuid::Uuid;

use crate::collaborators::Ledger;
use crate::entities::ledger_entry::{self, LedgerEntryKind};
use crate::error::AppResult;
use crate::reservation::PaymentMethod;

/// Ledger backed by the `ledger_entry` table. The unique reservation id
/// column stops a trip from being billed twice.
#[derive(Clone)]
pub struct SeaOrmLedger {
    db: DatabaseConnection,
}

impl SeaOrmLedger {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn is_duplicate_entry(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl Ledger for SeaOrmLedger {
    async fn record_completion(
        &self,
        reservation_id: Uuid,
        payment_method: PaymentMethod,
        amount: f64,
    ) -> AppResult<()> {
        let kind = LedgerEntryKind::for_payment(payment_method);

        let entry = ledger_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            reservation_id: Set(reservation_id),
            kind: Set(kind),
            payment_method: Set(payment_method),
            amount: Set(amount),
            created_at: Set(Utc::now().into()),
        };

        match entry.insert(&self.db).await {
            Ok(_) => {
                tracing::info!(%reservation_id, ?kind, amount, "Ledger entry recorded");
                Ok(())
            }
            // A retried completion whose earlier insert committed after the
            // caller timed out
            Err(err) if is_duplicate_entry(&err) => {
                tracing::warn!(%reservation_id, "Ledger entry already recorded");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}
