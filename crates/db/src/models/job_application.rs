use kazi_core::application::ApplicationStatus;
use kazi_core::error::CoreError;
use kazi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `job_applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobApplication {
    pub id: DbId,
    pub job_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl JobApplication {
    /// The typed status. Fails only if the column holds a value the
    /// `ck_job_applications_status` constraint would not allow.
    pub fn status(&self) -> Result<ApplicationStatus, CoreError> {
        ApplicationStatus::parse(&self.status)
    }
}

/// DTO for a worker applying to a job. New applications start `pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateJobApplication {
    pub job_id: DbId,
    pub user_id: DbId,
}
