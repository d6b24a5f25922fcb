//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for the work session list endpoints
/// (`?status=&limit=&offset=`).
///
/// `status` accepts any status name or one of the short aliases understood
/// by `WorkSessionStatus::parse_filter`. `limit` and `offset` are clamped
/// with `clamp_limit` / `clamp_offset`.
#[derive(Debug, Default, Deserialize)]
pub struct WorkSessionListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
