//! The work session state machine.
//!
//! ```text
//! AwaitingStartApproval --ApproveStart(yes)--> ReadyToStart --BeginWork--> InProgress
//!          |                                                                  |
//!   ApproveStart(no)                                                       EndWork
//!          v                                                                  v
//!    StartRejected        EndRejected <--ApproveEnd(no)-- AwaitingEndApproval
//!                                                                |
//!                                                        ApproveEnd(yes)
//!                                                                v
//!                                                            Completed  (payment released)
//! ```
//!
//! [`apply_transition`] checks, in order: the event payload, the actor, the
//! current state. A replayed event therefore fails on the state check rather
//! than being applied twice.

use crate::error::CoreError;
use crate::payment::PaymentRelease;
use crate::roles::{Actor, ActorRole};
use crate::types::Timestamp;

use super::{validate_notes, WorkSession, WorkSessionStatus};

/// Milliseconds per hour, for `hours_worked`.
const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// An employer's approve/reject decision at either gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub approved: bool,
    pub notes: Option<String>,
}

impl Decision {
    pub fn approve(notes: Option<String>) -> Self {
        Self {
            approved: true,
            notes,
        }
    }

    pub fn reject(notes: impl Into<String>) -> Self {
        Self {
            approved: false,
            notes: Some(notes.into()),
        }
    }
}

/// Something a party asks to happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkSessionEvent {
    /// Employer decides whether work may start.
    ApproveStart(Decision),
    /// Worker starts working.
    BeginWork { notes: Option<String> },
    /// Worker stops working.
    EndWork { notes: Option<String> },
    /// Employer decides whether the work is accepted and paid.
    ApproveEnd(Decision),
}

impl WorkSessionEvent {
    /// Short name for logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApproveStart(_) => "approve_start",
            Self::BeginWork { .. } => "begin_work",
            Self::EndWork { .. } => "end_work",
            Self::ApproveEnd(_) => "approve_end",
        }
    }

    /// The role allowed to raise this event.
    pub fn required_role(&self) -> ActorRole {
        match self {
            Self::ApproveStart(_) | Self::ApproveEnd(_) => ActorRole::Employer,
            Self::BeginWork { .. } | Self::EndWork { .. } => ActorRole::Worker,
        }
    }
}

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: WorkSessionStatus,
    pub session: WorkSession,
    /// Set only on `AwaitingEndApproval -> Completed`.
    pub payment: Option<PaymentRelease>,
}

/// Apply `event`, raised by `actor` at time `now`, to `session`.
///
/// Pure: returns the next snapshot (and any payment owed) or an error, and
/// never touches `session`. Persisting the result, including the optimistic
/// check against concurrent writers, is the caller's job.
pub fn apply_transition(
    session: &WorkSession,
    event: WorkSessionEvent,
    actor: &Actor,
    now: Timestamp,
) -> Result<Transition, CoreError> {
    validate_payload(&event)?;
    authorize(session, &event, actor)?;

    let from = session.status;
    let mut next = session.clone();
    let mut payment = None;

    match (from, event) {
        (WorkSessionStatus::AwaitingStartApproval, WorkSessionEvent::ApproveStart(decision)) => {
            next.status = if decision.approved {
                WorkSessionStatus::ReadyToStart
            } else {
                WorkSessionStatus::StartRejected
            };
            next.employer_start_notes = normalize(decision.notes);
        }
        (WorkSessionStatus::ReadyToStart, WorkSessionEvent::BeginWork { notes }) => {
            next.status = WorkSessionStatus::InProgress;
            next.start_time = Some(now);
            next.notes = normalize(notes);
        }
        (WorkSessionStatus::InProgress, WorkSessionEvent::EndWork { notes }) => {
            let start = session.start_time.ok_or_else(|| {
                CoreError::Internal(format!(
                    "Work session {} is in progress without a start time",
                    session.id
                ))
            })?;
            next.status = WorkSessionStatus::AwaitingEndApproval;
            next.end_time = Some(now);
            next.hours_worked = Some(elapsed_hours(start, now));
            next.end_notes = normalize(notes);
        }
        (WorkSessionStatus::AwaitingEndApproval, WorkSessionEvent::ApproveEnd(decision)) => {
            next.employer_end_notes = normalize(decision.notes);
            if decision.approved {
                next.status = WorkSessionStatus::Completed;
                payment = Some(PaymentRelease {
                    work_session_id: session.id,
                    employer_id: session.employer_id,
                    user_id: session.user_id,
                    amount: session.daily_payment,
                });
            } else {
                next.status = WorkSessionStatus::EndRejected;
            }
        }
        (from, event) => {
            return Err(CoreError::InvalidStateTransition(format!(
                "Cannot {} work session {} while it is {from}",
                event.name(),
                session.id
            )));
        }
    }

    Ok(Transition {
        from,
        session: next,
        payment,
    })
}

/// Elapsed time between two instants in fractional hours, at the
/// microsecond precision Postgres stores timestamps with.
pub fn elapsed_hours(start: Timestamp, end: Timestamp) -> f64 {
    let elapsed = end - start;
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / MICROS_PER_HOUR,
        // Only spans beyond ~292,000 years overflow microseconds.
        None => elapsed.num_seconds() as f64 / 3_600.0,
    }
}

fn validate_payload(event: &WorkSessionEvent) -> Result<(), CoreError> {
    match event {
        WorkSessionEvent::ApproveStart(decision) | WorkSessionEvent::ApproveEnd(decision) => {
            validate_notes(decision.notes.as_deref())?;
            if !decision.approved && is_blank(decision.notes.as_deref()) {
                return Err(CoreError::Validation(
                    "A rejection must include employer notes explaining the reason".to_string(),
                ));
            }
            Ok(())
        }
        WorkSessionEvent::BeginWork { notes } | WorkSessionEvent::EndWork { notes } => {
            validate_notes(notes.as_deref())
        }
    }
}

fn authorize(
    session: &WorkSession,
    event: &WorkSessionEvent,
    actor: &Actor,
) -> Result<(), CoreError> {
    let required = event.required_role();
    let party = match event {
        WorkSessionEvent::ApproveStart(_) | WorkSessionEvent::ApproveEnd(_) => session.employer_id,
        WorkSessionEvent::BeginWork { .. } | WorkSessionEvent::EndWork { .. } => session.user_id,
    };

    if actor.role != required || actor.id != party {
        return Err(CoreError::Forbidden(format!(
            "Only the {required} of work session {} may {}",
            session.id,
            event.name()
        )));
    }
    Ok(())
}

fn is_blank(text: Option<&str>) -> bool {
    text.map_or(true, |t| t.trim().is_empty())
}

/// Empty notes are stored as absent.
fn normalize(notes: Option<String>) -> Option<String> {
    notes.filter(|n| !n.trim().is_empty())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
