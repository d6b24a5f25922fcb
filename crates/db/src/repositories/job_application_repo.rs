//! Repository for the `job_applications` table.

use kazi_core::application::ApplicationStatus;
use kazi_core::types::DbId;
use sqlx::PgPool;

use crate::models::job_application::{CreateJobApplication, JobApplication};

const COLUMNS: &str = "id, job_id, user_id, status, created_at, updated_at";

pub struct JobApplicationRepo;

impl JobApplicationRepo {
    /// Insert a pending application. Fails with `uq_job_applications_job_user`
    /// if the worker already applied.
    pub async fn create(
        pool: &PgPool,
        input: &CreateJobApplication,
    ) -> Result<JobApplication, sqlx::Error> {
        let query = format!(
            "INSERT INTO job_applications (job_id, user_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobApplication>(&query)
            .bind(input.job_id)
            .bind(input.user_id)
            .fetch_one(pool)
            .await
    }

    /// Set an application's status.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: ApplicationStatus,
    ) -> Result<Option<JobApplication>, sqlx::Error> {
        let query = format!(
            "UPDATE job_applications SET status = $2 WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, JobApplication>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Whether `user_id` holds an accepted application for `job_id`.
    pub async fn has_accepted(
        pool: &PgPool,
        job_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                SELECT 1 FROM job_applications
                WHERE job_id = $1 AND user_id = $2 AND status = $3
             )",
        )
        .bind(job_id)
        .bind(user_id)
        .bind(ApplicationStatus::Accepted.as_str())
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
