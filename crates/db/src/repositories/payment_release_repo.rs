//! Access to the `payment_releases` ledger. Rows are only inserted by
//! [`WorkSessionRepo::save_transition`](super::WorkSessionRepo::save_transition);
//! this repository reads them and tracks delivery.

use kazi_core::types::DbId;
use sqlx::PgPool;

use crate::models::payment_release::PaymentReleaseRecord;

pub(crate) const COLUMNS: &str =
    "id, work_session_id, employer_id, user_id, amount, released_at, delivered_at, \
     created_at, updated_at";

pub struct PaymentReleaseRepo;

impl PaymentReleaseRepo {
    pub async fn find_by_work_session(
        pool: &PgPool,
        work_session_id: DbId,
    ) -> Result<Option<PaymentReleaseRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_releases WHERE work_session_id = $1");
        sqlx::query_as::<_, PaymentReleaseRecord>(&query)
            .bind(work_session_id)
            .fetch_optional(pool)
            .await
    }

    /// Oldest releases the payment trigger has not yet accepted.
    pub async fn list_undelivered(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<PaymentReleaseRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payment_releases
             WHERE delivered_at IS NULL
             ORDER BY released_at, id
             LIMIT $1"
        );
        sqlx::query_as::<_, PaymentReleaseRecord>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Stamp a release as delivered. Returns `None` if it was already
    /// stamped or does not exist.
    pub async fn mark_delivered(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PaymentReleaseRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE payment_releases SET delivered_at = NOW()
             WHERE id = $1 AND delivered_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentReleaseRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
