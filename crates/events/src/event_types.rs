//! Event names published on the bus.

/// Source entity kind for every work session event.
pub const ENTITY_WORK_SESSION: &str = "work_session";

/// A worker opened a session on a job.
pub const WORK_SESSION_CREATED: &str = "work_session.created";

/// A session moved to a new status. Payload carries `from` and `to`.
pub const WORK_SESSION_TRANSITIONED: &str = "work_session.transitioned";

/// An employer approved the end of work and the daily payment is owed.
pub const WORK_SESSION_PAYMENT_RELEASED: &str = "work_session.payment_released";
