//! Work session rows and their conversion to the domain snapshot.

use kazi_core::error::CoreError;
use kazi_core::types::{Amount, DbId, Timestamp};
use kazi_core::work_session::{WorkSession, WorkSessionStatus};
use serde::Serialize;
use sqlx::FromRow;

use super::payment_release::PaymentReleaseRecord;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// A row from the `work_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkSessionRow {
    pub id: DbId,
    pub job_id: DbId,
    pub user_id: DbId,
    pub employer_id: DbId,
    pub daily_payment: Amount,
    pub status_id: StatusId,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub hours_worked: Option<f64>,
    pub notes: Option<String>,
    pub end_notes: Option<String>,
    pub employer_start_notes: Option<String>,
    pub employer_end_notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Title of the session's job, joined for display.
    pub job_title: String,
}

impl TryFrom<WorkSessionRow> for WorkSession {
    type Error = CoreError;

    fn try_from(row: WorkSessionRow) -> Result<Self, Self::Error> {
        let status = WorkSessionStatus::from_id(row.status_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Work session {} has unknown status_id {}",
                row.id, row.status_id
            ))
        })?;

        Ok(WorkSession {
            id: row.id,
            job_id: row.job_id,
            user_id: row.user_id,
            employer_id: row.employer_id,
            daily_payment: row.daily_payment,
            status,
            start_time: row.start_time,
            end_time: row.end_time,
            hours_worked: row.hours_worked,
            notes: row.notes,
            end_notes: row.end_notes,
            employer_start_notes: row.employer_start_notes,
            employer_end_notes: row.employer_end_notes,
            created_at: row.created_at,
        })
    }
}

/// Outcome of a successful optimistic save.
#[derive(Debug, Clone)]
pub struct SavedTransition {
    pub session: WorkSessionRow,
    /// Present when the save completed the session.
    pub payment: Option<PaymentReleaseRecord>,
}
