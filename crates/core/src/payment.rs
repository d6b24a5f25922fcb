//! Payment release produced when an employer approves the end of work.
//!
//! The lifecycle only *describes* the release; delivering it is the job of a
//! [`PaymentTrigger`] implementation supplied by the application layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Amount, DbId};

/// A single payout owed to a worker for one completed work session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRelease {
    pub work_session_id: DbId,
    pub employer_id: DbId,
    pub user_id: DbId,
    pub amount: Amount,
}

/// Side channel that moves money once a session is completed.
///
/// Called exactly once per session, after the `Completed` state has been
/// persisted. Implementations must not retry internally.
#[async_trait]
pub trait PaymentTrigger: Send + Sync {
    async fn release(&self, release: &PaymentRelease) -> Result<(), CoreError>;
}
