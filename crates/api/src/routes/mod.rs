pub mod health;
pub mod work_session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /work-sessions                                   create
/// /work-sessions/my-sessions                       worker list
/// /work-sessions/summary                           worker summary
/// /work-sessions/employer/sessions                 employer list
/// /work-sessions/employer/summary                  employer summary
/// /work-sessions/{id}                              get
/// /work-sessions/{id}/approve-start                employer decision
/// /work-sessions/{id}/request-start                worker begins
/// /work-sessions/{id}/request-end                  worker ends
/// /work-sessions/{id}/approve-end                  employer decision, pays
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/work-sessions", work_session::router())
}
