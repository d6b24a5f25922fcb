//! Dashboard totals over a set of work sessions.

use serde::Serialize;

use crate::types::Amount;

use super::{WorkSession, WorkSessionStatus};

/// Counts and totals shown on worker and employer dashboards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkSessionSummary {
    pub total_sessions: i64,
    /// Sessions whose end was approved (`Completed`).
    pub approved_sessions: i64,
    pub pending_start_approval: i64,
    pub ready_to_start: i64,
    pub in_progress: i64,
    pub pending_end_approval: i64,
    pub start_rejected: i64,
    pub end_rejected: i64,
    /// Sum of `daily_payment` over completed sessions.
    pub total_earnings: Amount,
    /// Sum of `daily_payment` over sessions awaiting end approval.
    pub pending_earnings: Amount,
    /// Sum of `hours_worked` over completed sessions.
    pub total_hours: f64,
}

/// Reduce `sessions` to a [`WorkSessionSummary`]. An empty slice yields all zeros.
pub fn summarize(sessions: &[WorkSession]) -> WorkSessionSummary {
    sessions
        .iter()
        .fold(WorkSessionSummary::default(), |mut acc, session| {
            acc.total_sessions += 1;
            match session.status {
                WorkSessionStatus::AwaitingStartApproval => acc.pending_start_approval += 1,
                WorkSessionStatus::ReadyToStart => acc.ready_to_start += 1,
                WorkSessionStatus::InProgress => acc.in_progress += 1,
                WorkSessionStatus::AwaitingEndApproval => {
                    acc.pending_end_approval += 1;
                    acc.pending_earnings += session.daily_payment;
                }
                WorkSessionStatus::Completed => {
                    acc.approved_sessions += 1;
                    acc.total_earnings += session.daily_payment;
                    acc.total_hours += session.hours_worked.unwrap_or(0.0);
                }
                WorkSessionStatus::StartRejected => acc.start_rejected += 1,
                WorkSessionStatus::EndRejected => acc.end_rejected += 1,
            }
            acc
        })
}
