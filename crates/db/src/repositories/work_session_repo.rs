//! Repository for the `work_sessions` table.
//!
//! Reads return [`WorkSessionRow`]s; conversion to the domain snapshot
//! happens in the caller via `WorkSession::try_from`.

use kazi_core::payment::PaymentRelease;
use kazi_core::types::DbId;
use kazi_core::work_session::{NewWorkSession, WorkSession, WorkSessionStatus};
use sqlx::PgPool;

use crate::models::payment_release::PaymentReleaseRecord;
use crate::models::work_session::{SavedTransition, StatusId, WorkSessionRow};
use crate::repositories::payment_release_repo::COLUMNS as PAYMENT_COLUMNS;

/// Selected from `work_sessions` by name, so the same list serves `SELECT`,
/// `INSERT ... RETURNING` and `UPDATE ... RETURNING`. The job title comes
/// from a correlated subquery; `jobs` rows cannot be deleted from under a
/// session.
const COLUMNS: &str = "id, job_id, user_id, employer_id, daily_payment, status_id, \
    start_time, end_time, hours_worked, notes, end_notes, \
    employer_start_notes, employer_end_notes, created_at, updated_at, \
    (SELECT jobs.title FROM jobs WHERE jobs.id = work_sessions.job_id) AS job_title";

/// Which party column a list query filters on.
#[derive(Debug, Clone, Copy)]
enum Party {
    Worker,
    Employer,
}

impl Party {
    fn column(self) -> &'static str {
        match self {
            Party::Worker => "user_id",
            Party::Employer => "employer_id",
        }
    }
}

pub struct WorkSessionRepo;

impl WorkSessionRepo {
    /// Insert a new session in `awaiting_start_approval`.
    ///
    /// A concurrent duplicate fails on `uq_work_sessions_open_per_job`.
    pub async fn create(
        pool: &PgPool,
        input: &NewWorkSession,
    ) -> Result<WorkSessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO work_sessions (job_id, user_id, employer_id, daily_payment, status_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkSessionRow>(&query)
            .bind(input.job_id)
            .bind(input.user_id)
            .bind(input.employer_id)
            .bind(input.daily_payment)
            .bind(WorkSessionStatus::AwaitingStartApproval.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM work_sessions WHERE id = $1");
        sqlx::query_as::<_, WorkSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The worker's open session on a job, if any.
    pub async fn find_open_for_job(
        pool: &PgPool,
        user_id: DbId,
        job_id: DbId,
    ) -> Result<Option<WorkSessionRow>, sqlx::Error> {
        let open: Vec<StatusId> = WorkSessionStatus::OPEN.iter().map(|s| s.id()).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM work_sessions
             WHERE user_id = $1 AND job_id = $2 AND status_id = ANY($3)
             LIMIT 1"
        );
        sqlx::query_as::<_, WorkSessionRow>(&query)
            .bind(user_id)
            .bind(job_id)
            .bind(open)
            .fetch_optional(pool)
            .await
    }

    /// A page of the worker's sessions, newest first.
    pub async fn list_for_worker(
        pool: &PgPool,
        user_id: DbId,
        status: Option<WorkSessionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkSessionRow>, sqlx::Error> {
        Self::list_page(pool, Party::Worker, user_id, status, limit, offset).await
    }

    /// A page of the sessions on the employer's jobs, newest first.
    pub async fn list_for_employer(
        pool: &PgPool,
        employer_id: DbId,
        status: Option<WorkSessionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkSessionRow>, sqlx::Error> {
        Self::list_page(pool, Party::Employer, employer_id, status, limit, offset).await
    }

    /// Every session of the worker, for summaries.
    pub async fn list_all_for_worker(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<WorkSessionRow>, sqlx::Error> {
        Self::list_all(pool, Party::Worker, user_id).await
    }

    /// Every session on the employer's jobs, for summaries.
    pub async fn list_all_for_employer(
        pool: &PgPool,
        employer_id: DbId,
    ) -> Result<Vec<WorkSessionRow>, sqlx::Error> {
        Self::list_all(pool, Party::Employer, employer_id).await
    }

    /// Persist `next` only if the stored row is still in `expected` status.
    ///
    /// When `payment` is given the release is recorded in the same
    /// transaction. Returns `None` if no row matched: either the session does
    /// not exist or another writer moved it first.
    pub async fn save_transition(
        pool: &PgPool,
        expected: WorkSessionStatus,
        next: &WorkSession,
        payment: Option<&PaymentRelease>,
    ) -> Result<Option<SavedTransition>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE work_sessions SET
                status_id = $3,
                start_time = $4,
                end_time = $5,
                hours_worked = $6,
                notes = $7,
                end_notes = $8,
                employer_start_notes = $9,
                employer_end_notes = $10
             WHERE id = $1 AND status_id = $2
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, WorkSessionRow>(&query)
            .bind(next.id)
            .bind(expected.id())
            .bind(next.status.id())
            .bind(next.start_time)
            .bind(next.end_time)
            .bind(next.hours_worked)
            .bind(&next.notes)
            .bind(&next.end_notes)
            .bind(&next.employer_start_notes)
            .bind(&next.employer_end_notes)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(session) = updated else {
            tx.rollback().await?;
            tracing::debug!(
                work_session_id = next.id,
                expected = %expected,
                "Optimistic save matched no row"
            );
            return Ok(None);
        };

        let payment = match payment {
            Some(release) => {
                let query = format!(
                    "INSERT INTO payment_releases (work_session_id, employer_id, user_id, amount)
                     VALUES ($1, $2, $3, $4)
                     RETURNING {PAYMENT_COLUMNS}"
                );
                let record = sqlx::query_as::<_, PaymentReleaseRecord>(&query)
                    .bind(release.work_session_id)
                    .bind(release.employer_id)
                    .bind(release.user_id)
                    .bind(release.amount)
                    .fetch_one(&mut *tx)
                    .await?;
                Some(record)
            }
            None => None,
        };

        tx.commit().await?;
        Ok(Some(SavedTransition { session, payment }))
    }

    async fn list_page(
        pool: &PgPool,
        party: Party,
        party_id: DbId,
        status: Option<WorkSessionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM work_sessions
             WHERE {party} = $1
               AND ($2::SMALLINT IS NULL OR status_id = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4",
            party = party.column(),
        );
        sqlx::query_as::<_, WorkSessionRow>(&query)
            .bind(party_id)
            .bind(status.map(WorkSessionStatus::id))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    async fn list_all(
        pool: &PgPool,
        party: Party,
        party_id: DbId,
    ) -> Result<Vec<WorkSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM work_sessions
             WHERE {party} = $1
             ORDER BY created_at DESC, id DESC",
            party = party.column(),
        );
        sqlx::query_as::<_, WorkSessionRow>(&query)
            .bind(party_id)
            .fetch_all(pool)
            .await
    }
}
