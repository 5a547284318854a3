//! Service-request status state machine.
//!
//! The status column is not a free-form enum: every mutation must pass
//! through [`RequestStatus::ensure_transition`], and repository updates
//! additionally guard with `WHERE status = $expected` so concurrent
//! writers cannot race a row through an illegal path.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of a service request.
///
/// ```text
/// pending ----> quoted ----> accepted ----> in_progress ----> completed
///    |            |
///    +------------+--------> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Quoted,
    Accepted,
    InProgress,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// The stored column value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Quoted => "quoted",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a stored column value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending" => Ok(Self::Pending),
            "quoted" => Ok(Self::Quoted),
            "accepted" => Ok(Self::Accepted),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown request status: {other}"
            ))),
        }
    }

    /// The set of states this status may legally move to.
    pub fn allowed_transitions(self) -> &'static [RequestStatus] {
        match self {
            Self::Pending => &[Self::Quoted, Self::Accepted, Self::Cancelled],
            Self::Quoted => &[Self::Accepted, Self::Cancelled],
            Self::Accepted => &[Self::InProgress],
            Self::InProgress => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition(self, to: RequestStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Guard a transition, returning a typed error for illegal jumps.
    pub fn ensure_transition(self, to: RequestStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                entity: "service request",
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_happy_path_transitions() {
        assert!(RequestStatus::Pending.can_transition(RequestStatus::Quoted));
        assert!(RequestStatus::Quoted.can_transition(RequestStatus::Accepted));
        assert!(RequestStatus::Accepted.can_transition(RequestStatus::InProgress));
        assert!(RequestStatus::InProgress.can_transition(RequestStatus::Completed));
    }

    #[test]
    fn test_cancel_only_before_acceptance() {
        assert!(RequestStatus::Pending.can_transition(RequestStatus::Cancelled));
        assert!(RequestStatus::Quoted.can_transition(RequestStatus::Cancelled));
        assert!(!RequestStatus::Accepted.can_transition(RequestStatus::Cancelled));
        assert!(!RequestStatus::InProgress.can_transition(RequestStatus::Cancelled));
    }

    #[test]
    fn test_illegal_jump_is_typed_error() {
        let result = RequestStatus::Pending.ensure_transition(RequestStatus::Completed);
        assert_matches!(
            result,
            Err(CoreError::InvalidTransition {
                from: "pending",
                to: "completed",
                ..
            })
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
        assert!(!RequestStatus::Pending.is_terminal());
    }

    #[test]
    fn test_parse_round_trips() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Quoted,
            RequestStatus::Accepted,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(RequestStatus::parse("bogus").is_err());
    }
}
