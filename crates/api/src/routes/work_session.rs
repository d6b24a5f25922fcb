//! Route definitions for the work session lifecycle, nested under `/work-sessions`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::work_session;
use crate::state::AppState;

/// ```text
/// POST   /                         create_work_session
/// GET    /my-sessions              list_my_sessions
/// GET    /summary                  worker_summary
/// GET    /employer/sessions        list_employer_sessions
/// GET    /employer/summary         employer_summary
/// GET    /{id}                     get_work_session
/// POST   /{id}/approve-start       approve_start
/// POST   /{id}/request-start       request_start
/// POST   /{id}/request-end         request_end
/// POST   /{id}/approve-end         approve_end
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(work_session::create_work_session))
        .route("/my-sessions", get(work_session::list_my_sessions))
        .route("/summary", get(work_session::worker_summary))
        .route("/employer/sessions", get(work_session::list_employer_sessions))
        .route("/employer/summary", get(work_session::employer_summary))
        .route("/{id}", get(work_session::get_work_session))
        .route("/{id}/approve-start", post(work_session::approve_start))
        .route("/{id}/request-start", post(work_session::request_start))
        .route("/{id}/request-end", post(work_session::request_end))
        .route("/{id}/approve-end", post(work_session::approve_end))
}
