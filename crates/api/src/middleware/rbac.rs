//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Lifecycle transitions do not use these: the state machine checks
//! that the caller is the session's own worker or employer.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use kazi_core::error::CoreError;
use kazi_core::roles::ActorRole;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `worker` role (legacy `user` tokens included).
///
/// ```ignore
/// async fn worker_only(RequireWorker(user): RequireWorker) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireWorker(pub AuthUser);

impl FromRequestParts<AppState> for RequireWorker {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ActorRole::Worker {
            return Err(AppError::Core(CoreError::Forbidden(
                "Worker role required".into(),
            )));
        }
        Ok(RequireWorker(user))
    }
}

/// Requires the `employer` role.
pub struct RequireEmployer(pub AuthUser);

impl FromRequestParts<AppState> for RequireEmployer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ActorRole::Employer {
            return Err(AppError::Core(CoreError::Forbidden(
                "Employer role required".into(),
            )));
        }
        Ok(RequireEmployer(user))
    }
}
