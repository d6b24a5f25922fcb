//! Handlers for the work session lifecycle.
//!
//! Every transition endpoint follows the same path: load the session, apply
//! the event with [`apply_transition`], save with an optimistic status check,
//! then publish events and fire the payment trigger once the save has
//! committed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use kazi_core::error::CoreError;
use kazi_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use kazi_core::roles::{Actor, ActorRole};
use kazi_core::types::{Amount, DbId, Timestamp};
use kazi_core::work_session::{
    apply_transition, summarize, validate_new_session, Decision, GateFlags, NewWorkSession,
    WorkSession, WorkSessionEvent, WorkSessionStatus, WorkSessionSummary,
};
use kazi_db::models::payment_release::PaymentReleaseRecord;
use kazi_db::models::work_session::WorkSessionRow;
use kazi_db::repositories::{JobApplicationRepo, JobRepo, WorkSessionRepo};
use kazi_events::bus::PlatformEvent;
use kazi_events::event_types::{
    ENTITY_WORK_SESSION, WORK_SESSION_CREATED, WORK_SESSION_TRANSITIONED,
};

use crate::error::{AppError, AppResult};
use crate::payment::deliver;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireEmployer, RequireWorker};
use crate::query::WorkSessionListParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /work-sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateWorkSessionRequest {
    pub job_id: DbId,
    pub daily_payment: Amount,
}

/// Body of the approve-start and approve-end endpoints.
///
/// `approved` defaults to `true`, so a body carrying only notes approves.
#[derive(Debug, Deserialize)]
pub struct EmployerDecisionRequest {
    #[serde(default = "approve_by_default")]
    pub approved: bool,
    #[serde(default)]
    pub employer_notes: Option<String>,
}

fn approve_by_default() -> bool {
    true
}

/// Body of the request-start and request-end endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct WorkerNotesRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// A work session as returned by the API: the stored fields, the job title,
/// the derived gate flags, and the payment recorded by this request if any.
#[derive(Debug, Serialize)]
pub struct WorkSessionResponse {
    #[serde(flatten)]
    pub session: WorkSession,
    pub job_title: String,
    #[serde(flatten)]
    pub gates: GateFlags,
    pub updated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentReleaseRecord>,
}

impl TryFrom<WorkSessionRow> for WorkSessionResponse {
    type Error = CoreError;

    fn try_from(row: WorkSessionRow) -> Result<Self, Self::Error> {
        let updated_at = row.updated_at;
        let job_title = row.job_title.clone();
        let session = WorkSession::try_from(row)?;
        Ok(Self {
            gates: session.gates(),
            session,
            job_title,
            updated_at,
            payment: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a session snapshot or fail with `NotFound`.
async fn load_session(state: &AppState, id: DbId) -> AppResult<(WorkSession, WorkSessionRow)> {
    let row = WorkSessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "WorkSession",
            id,
        })?;
    let session = WorkSession::try_from(row.clone())?;
    Ok((session, row))
}

/// Apply `event` for `actor`, persist it, and run post-commit side effects.
async fn run_transition(
    state: &AppState,
    id: DbId,
    event: WorkSessionEvent,
    actor: Actor,
) -> AppResult<WorkSessionResponse> {
    let event_name = event.name();
    let (session, _) = load_session(state, id).await?;
    let transition = apply_transition(&session, event, &actor, Utc::now())?;

    let saved = WorkSessionRepo::save_transition(
        &state.pool,
        transition.from,
        &transition.session,
        transition.payment.as_ref(),
    )
    .await?;

    let Some(saved) = saved else {
        // Either another request moved the session first or it vanished.
        if WorkSessionRepo::find_by_id(&state.pool, id).await?.is_some() {
            tracing::warn!(
                work_session_id = id,
                event = event_name,
                expected = %transition.from,
                "Work session changed concurrently"
            );
            return Err(CoreError::Conflict(format!(
                "Work session {id} was modified by another request; reload and retry"
            ))
            .into());
        }
        return Err(CoreError::NotFound {
            entity: "WorkSession",
            id,
        }
        .into());
    };

    let to = transition.session.status;
    tracing::info!(
        work_session_id = id,
        user_id = actor.id,
        role = %actor.role,
        event = event_name,
        from = %transition.from,
        to = %to,
        "Work session transitioned"
    );

    state.event_bus.publish(
        PlatformEvent::new(WORK_SESSION_TRANSITIONED)
            .with_source(ENTITY_WORK_SESSION, id)
            .with_actor(actor.id)
            .with_payload(serde_json::json!({
                "event": event_name,
                "from": transition.from,
                "to": to,
            })),
    );

    let mut response = WorkSessionResponse::try_from(saved.session)?;

    if let Some(record) = saved.payment {
        let (user_id, amount) = (record.user_id, record.amount);
        let record = match deliver(&state.pool, state.payment_trigger.as_ref(), record).await {
            Ok(record) => record,
            Err(err) => {
                // The ledger row stays undelivered for the startup sweep.
                tracing::error!(
                    work_session_id = id,
                    amount,
                    error = %err,
                    "Payment trigger failed after completion was recorded"
                );
                return Err(err);
            }
        };
        tracing::info!(work_session_id = id, user_id, amount, "Payment released");
        response.payment = Some(record);
    }

    Ok(response)
}

fn to_responses(rows: Vec<WorkSessionRow>) -> AppResult<Vec<WorkSessionResponse>> {
    rows.into_iter()
        .map(|row| WorkSessionResponse::try_from(row).map_err(AppError::from))
        .collect()
}

fn to_sessions(rows: Vec<WorkSessionRow>) -> AppResult<Vec<WorkSession>> {
    rows.into_iter()
        .map(|row| WorkSession::try_from(row).map_err(AppError::from))
        .collect()
}

fn parse_status_filter(params: &WorkSessionListParams) -> AppResult<Option<WorkSessionStatus>> {
    params
        .status
        .as_deref()
        .map(WorkSessionStatus::parse_filter)
        .transpose()
        .map_err(AppError::from)
}

// ---------------------------------------------------------------------------
// Creation and lookup
// ---------------------------------------------------------------------------

/// POST /api/v1/work-sessions
///
/// Open a session on a job the worker was accepted for.
pub async fn create_work_session(
    RequireWorker(worker): RequireWorker,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkSessionRequest>,
) -> AppResult<impl IntoResponse> {
    let job = JobRepo::find_by_id(&state.pool, input.job_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Job",
            id: input.job_id,
        })?;

    let new_session = NewWorkSession {
        job_id: job.id,
        user_id: worker.user_id,
        employer_id: job.employer_id,
        daily_payment: input.daily_payment,
    };
    validate_new_session(&new_session)?;

    if !JobApplicationRepo::has_accepted(&state.pool, job.id, worker.user_id).await? {
        return Err(CoreError::Forbidden(format!(
            "You are not accepted for job {}",
            job.id
        ))
        .into());
    }

    let open = WorkSessionRepo::find_open_for_job(&state.pool, worker.user_id, job.id).await?;
    if let Some(open) = open {
        return Err(CoreError::Conflict(format!(
            "You already have an open work session ({}) for job {}",
            open.id, job.id
        ))
        .into());
    }

    let row = WorkSessionRepo::create(&state.pool, &new_session).await?;

    tracing::info!(
        work_session_id = row.id,
        job_id = row.job_id,
        user_id = row.user_id,
        employer_id = row.employer_id,
        daily_payment = row.daily_payment,
        "Work session created"
    );

    state.event_bus.publish(
        PlatformEvent::new(WORK_SESSION_CREATED)
            .with_source(ENTITY_WORK_SESSION, row.id)
            .with_actor(worker.user_id)
            .with_payload(serde_json::json!({
                "job_id": row.job_id,
                "employer_id": row.employer_id,
                "daily_payment": row.daily_payment,
            })),
    );

    let data = WorkSessionResponse::try_from(row)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/work-sessions/{id}
///
/// Visible to the session's worker, its employer, and admins.
pub async fn get_work_session(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (session, row) = load_session(&state, id).await?;

    let allowed = match auth.role {
        ActorRole::Admin => true,
        ActorRole::Worker => session.user_id == auth.user_id,
        ActorRole::Employer => session.employer_id == auth.user_id,
    };
    if !allowed {
        return Err(CoreError::Forbidden(format!("Not a party to work session {id}")).into());
    }

    let data = WorkSessionResponse::try_from(row)?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/work-sessions/{id}/approve-start
pub async fn approve_start(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EmployerDecisionRequest>,
) -> AppResult<impl IntoResponse> {
    let event = WorkSessionEvent::ApproveStart(Decision {
        approved: input.approved,
        notes: input.employer_notes,
    });
    let data = run_transition(&state, id, event, auth.actor()).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/work-sessions/{id}/request-start
pub async fn request_start(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<WorkerNotesRequest>,
) -> AppResult<impl IntoResponse> {
    let event = WorkSessionEvent::BeginWork { notes: input.notes };
    let data = run_transition(&state, id, event, auth.actor()).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/work-sessions/{id}/request-end
pub async fn request_end(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<WorkerNotesRequest>,
) -> AppResult<impl IntoResponse> {
    let event = WorkSessionEvent::EndWork { notes: input.notes };
    let data = run_transition(&state, id, event, auth.actor()).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/work-sessions/{id}/approve-end
///
/// Approval completes the session and releases `daily_payment`.
pub async fn approve_end(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EmployerDecisionRequest>,
) -> AppResult<impl IntoResponse> {
    let event = WorkSessionEvent::ApproveEnd(Decision {
        approved: input.approved,
        notes: input.employer_notes,
    });
    let data = run_transition(&state, id, event, auth.actor()).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Lists and summaries
// ---------------------------------------------------------------------------

/// GET /api/v1/work-sessions/my-sessions
pub async fn list_my_sessions(
    RequireWorker(worker): RequireWorker,
    State(state): State<AppState>,
    Query(params): Query<WorkSessionListParams>,
) -> AppResult<impl IntoResponse> {
    let status = parse_status_filter(&params)?;
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let rows =
        WorkSessionRepo::list_for_worker(&state.pool, worker.user_id, status, limit, offset).await?;
    Ok(Json(DataResponse {
        data: to_responses(rows)?,
    }))
}

/// GET /api/v1/work-sessions/employer/sessions
pub async fn list_employer_sessions(
    RequireEmployer(employer): RequireEmployer,
    State(state): State<AppState>,
    Query(params): Query<WorkSessionListParams>,
) -> AppResult<impl IntoResponse> {
    let status = parse_status_filter(&params)?;
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let rows =
        WorkSessionRepo::list_for_employer(&state.pool, employer.user_id, status, limit, offset)
            .await?;
    Ok(Json(DataResponse {
        data: to_responses(rows)?,
    }))
}

/// GET /api/v1/work-sessions/summary
pub async fn worker_summary(
    RequireWorker(worker): RequireWorker,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<WorkSessionSummary>>> {
    let rows = WorkSessionRepo::list_all_for_worker(&state.pool, worker.user_id).await?;
    let sessions = to_sessions(rows)?;
    Ok(Json(DataResponse {
        data: summarize(&sessions),
    }))
}

/// GET /api/v1/work-sessions/employer/summary
pub async fn employer_summary(
    RequireEmployer(employer): RequireEmployer,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<WorkSessionSummary>>> {
    let rows = WorkSessionRepo::list_all_for_employer(&state.pool, employer.user_id).await?;
    let sessions = to_sessions(rows)?;
    Ok(Json(DataResponse {
        data: summarize(&sessions),
    }))
}
