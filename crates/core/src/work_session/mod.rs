//! Work session aggregate and its lifecycle states.
//!
//! A work session is one engagement of a worker on a job for an employer.
//! Its progress is a single [`WorkSessionStatus`]; the four approval gates
//! clients display (`start_approved`, `work_started`, `work_ended`,
//! `end_approved`) are derived from it, so contradictory gate combinations
//! cannot be stored.
//!
//! - [`lifecycle`] -- events and the pure transition function.
//! - [`summary`] -- dashboard reduction over a set of sessions.

pub mod lifecycle;
pub mod summary;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{Amount, DbId, Timestamp};

pub use lifecycle::{apply_transition, Decision, Transition, WorkSessionEvent};
pub use summary::{summarize, WorkSessionSummary};

/// Maximum length for any worker or employer note.
pub const MAX_NOTES_LENGTH: usize = 5_000;

/* --------------------------------------------------------------------------
Status
-------------------------------------------------------------------------- */

/// Lifecycle state of a work session.
///
/// Discriminants match the seed order of the `work_session_statuses` lookup
/// table (1-based SMALLSERIAL).
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkSessionStatus {
    AwaitingStartApproval = 1,
    ReadyToStart = 2,
    InProgress = 3,
    AwaitingEndApproval = 4,
    Completed = 5,
    StartRejected = 6,
    EndRejected = 7,
}

impl WorkSessionStatus {
    pub const ALL: [WorkSessionStatus; 7] = [
        Self::AwaitingStartApproval,
        Self::ReadyToStart,
        Self::InProgress,
        Self::AwaitingEndApproval,
        Self::Completed,
        Self::StartRejected,
        Self::EndRejected,
    ];

    /// Statuses in which a worker still holds the job slot.
    pub const OPEN: [WorkSessionStatus; 3] =
        [Self::AwaitingStartApproval, Self::ReadyToStart, Self::InProgress];

    /// Return the database status ID.
    pub fn id(self) -> i16 {
        self as i16
    }

    /// Look up a status by its database ID.
    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Snake-case name, as used in API payloads and the lookup table.
    pub fn name(self) -> &'static str {
        match self {
            Self::AwaitingStartApproval => "awaiting_start_approval",
            Self::ReadyToStart => "ready_to_start",
            Self::InProgress => "in_progress",
            Self::AwaitingEndApproval => "awaiting_end_approval",
            Self::Completed => "completed",
            Self::StartRejected => "start_rejected",
            Self::EndRejected => "end_rejected",
        }
    }

    /// Parse a list filter value.
    ///
    /// Accepts every status name plus the short aliases older dashboards
    /// send: `pending_start`, `active`, `pending_end`.
    pub fn parse_filter(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending_start" => return Ok(Self::AwaitingStartApproval),
            "active" => return Ok(Self::InProgress),
            "pending_end" => return Ok(Self::AwaitingEndApproval),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|s| s.name() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid work session status '{value}'. Must be one of: {}, {}",
                    Self::ALL.map(Self::name).join(", "),
                    "pending_start, active, pending_end"
                ))
            })
    }

    /// No event is defined from a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::StartRejected | Self::EndRejected)
    }

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }

    /// Derive the four client-facing gate flags.
    pub fn gates(self) -> GateFlags {
        use WorkSessionStatus::*;
        GateFlags {
            start_approved: matches!(
                self,
                ReadyToStart | InProgress | AwaitingEndApproval | Completed | EndRejected
            ),
            work_started: matches!(
                self,
                InProgress | AwaitingEndApproval | Completed | EndRejected
            ),
            work_ended: matches!(self, AwaitingEndApproval | Completed | EndRejected),
            end_approved: matches!(self, Completed),
        }
    }
}

impl std::fmt::Display for WorkSessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The boolean view of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateFlags {
    pub start_approved: bool,
    pub work_started: bool,
    pub work_ended: bool,
    pub end_approved: bool,
}

/* --------------------------------------------------------------------------
Aggregate
-------------------------------------------------------------------------- */

/// Snapshot of a work session.
///
/// Lifecycle functions take a snapshot by reference and return a new one;
/// nothing here is mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: DbId,
    pub job_id: DbId,
    /// The worker.
    pub user_id: DbId,
    pub employer_id: DbId,
    pub daily_payment: Amount,
    pub status: WorkSessionStatus,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    /// Elapsed hours between `start_time` and `end_time`.
    pub hours_worked: Option<f64>,
    /// Worker notes given when starting work.
    pub notes: Option<String>,
    /// Worker notes given when ending work.
    pub end_notes: Option<String>,
    pub employer_start_notes: Option<String>,
    pub employer_end_notes: Option<String>,
    pub created_at: Timestamp,
}

impl WorkSession {
    pub fn gates(&self) -> GateFlags {
        self.status.gates()
    }
}

/// Input for opening a new session.
///
/// `employer_id` is copied from the job, never taken from the client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewWorkSession {
    pub job_id: DbId,
    pub user_id: DbId,
    pub employer_id: DbId,
    #[validate(range(min = 1, message = "daily_payment must be greater than zero"))]
    pub daily_payment: Amount,
}

/// Validate a new session before it is persisted.
pub fn validate_new_session(input: &NewWorkSession) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(e.to_string()))
}

/// Validate optional free-text notes.
pub fn validate_notes(notes: Option<&str>) -> Result<(), CoreError> {
    if let Some(text) = notes {
        if text.chars().count() > MAX_NOTES_LENGTH {
            return Err(CoreError::Validation(format!(
                "Notes exceed maximum length of {MAX_NOTES_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_round_trip() {
        for status in WorkSessionStatus::ALL {
            assert_eq!(WorkSessionStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(WorkSessionStatus::from_id(0), None);
        assert_eq!(WorkSessionStatus::from_id(8), None);
    }

    #[test]
    fn ids_are_one_based_in_declaration_order() {
        let ids: Vec<i16> = WorkSessionStatus::ALL.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn filter_accepts_names_and_aliases() {
        assert_eq!(
            WorkSessionStatus::parse_filter("pending_start").unwrap(),
            WorkSessionStatus::AwaitingStartApproval
        );
        assert_eq!(
            WorkSessionStatus::parse_filter("active").unwrap(),
            WorkSessionStatus::InProgress
        );
        assert_eq!(
            WorkSessionStatus::parse_filter("pending_end").unwrap(),
            WorkSessionStatus::AwaitingEndApproval
        );
        assert_eq!(
            WorkSessionStatus::parse_filter("completed").unwrap(),
            WorkSessionStatus::Completed
        );
        assert_eq!(
            WorkSessionStatus::parse_filter("start_rejected").unwrap(),
            WorkSessionStatus::StartRejected
        );
    }

    #[test]
    fn filter_rejects_unknown_values() {
        let err = WorkSessionStatus::parse_filter("paid").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn serde_uses_status_names() {
        for status in WorkSessionStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.name());
        }
    }

    #[test]
    fn gates_follow_total_ordering() {
        for status in WorkSessionStatus::ALL {
            let g = status.gates();
            if g.end_approved {
                assert!(g.work_ended, "{status}: end_approved without work_ended");
            }
            if g.work_ended {
                assert!(g.work_started, "{status}: work_ended without work_started");
            }
            if g.work_started {
                assert!(g.start_approved, "{status}: work_started without start_approved");
            }
        }
    }

    #[test]
    fn initial_state_has_no_gates_open() {
        let g = WorkSessionStatus::AwaitingStartApproval.gates();
        assert!(!g.start_approved && !g.work_started && !g.work_ended && !g.end_approved);
    }

    #[test]
    fn terminal_and_open_sets_are_disjoint() {
        for status in WorkSessionStatus::ALL {
            assert!(!(status.is_terminal() && status.is_open()), "{status}");
        }
        assert!(WorkSessionStatus::Completed.is_terminal());
        assert!(WorkSessionStatus::StartRejected.is_terminal());
        assert!(WorkSessionStatus::EndRejected.is_terminal());
        assert!(!WorkSessionStatus::AwaitingEndApproval.is_terminal());
    }

    #[test]
    fn new_session_requires_positive_payment() {
        let mut input = NewWorkSession {
            job_id: 1,
            user_id: 2,
            employer_id: 3,
            daily_payment: 5000,
        };
        assert!(validate_new_session(&input).is_ok());

        input.daily_payment = 0;
        let err = validate_new_session(&input).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn notes_length_is_bounded() {
        let ok = "a".repeat(MAX_NOTES_LENGTH);
        assert!(validate_notes(Some(&ok)).is_ok());
        let too_long = "a".repeat(MAX_NOTES_LENGTH + 1);
        assert!(validate_notes(Some(&too_long)).is_err());
        assert!(validate_notes(None).is_ok());
    }
}
