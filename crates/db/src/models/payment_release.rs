use kazi_core::payment::PaymentRelease;
use kazi_core::types::{Amount, DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `payment_releases` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentReleaseRecord {
    pub id: DbId,
    pub work_session_id: DbId,
    pub employer_id: DbId,
    pub user_id: DbId,
    pub amount: Amount,
    pub released_at: Timestamp,
    /// Set once the payment trigger accepted the release.
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentReleaseRecord {
    /// The release this record was written for.
    pub fn release(&self) -> PaymentRelease {
        PaymentRelease {
            work_session_id: self.work_session_id,
            employer_id: self.employer_id,
            user_id: self.user_id,
            amount: self.amount,
        }
    }
}
