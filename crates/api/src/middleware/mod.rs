//! Identity and role extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated account from a JWT Bearer token.
//! - [`rbac::RequireWorker`] -- requires the `worker` role.
//! - [`rbac::RequireEmployer`] -- requires the `employer` role.

pub mod auth;
pub mod rbac;
