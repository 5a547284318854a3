//! Proposal status state machine.
//!
//! Same discipline as [`crate::request_status`]: every mutation passes the
//! guard, and repository updates are conditional on the expected current
//! status so a double-accept surfaces as a conflict instead of a silent
//! overwrite.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle state of a priced proposal against a service request.
///
/// ```text
/// pending -> accepted -> paid -> completed
///    |
///    +-----> rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Paid,
    Completed,
}

impl ProposalStatus {
    /// The stored column value for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
            Self::Completed => "completed",
        }
    }

    /// Parse a stored column value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "paid" => Ok(Self::Paid),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown proposal status: {other}"
            ))),
        }
    }

    /// The set of states this status may legally move to.
    pub fn allowed_transitions(self) -> &'static [ProposalStatus] {
        match self {
            Self::Pending => &[Self::Accepted, Self::Rejected],
            Self::Accepted => &[Self::Paid],
            Self::Paid => &[Self::Completed],
            Self::Rejected | Self::Completed => &[],
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition(self, to: ProposalStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Guard a transition, returning a typed error for illegal jumps.
    pub fn ensure_transition(self, to: ProposalStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                entity: "proposal",
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_accept_then_pay_then_complete() {
        assert!(ProposalStatus::Pending.can_transition(ProposalStatus::Accepted));
        assert!(ProposalStatus::Accepted.can_transition(ProposalStatus::Paid));
        assert!(ProposalStatus::Paid.can_transition(ProposalStatus::Completed));
    }

    #[test]
    fn test_double_accept_is_illegal() {
        let result = ProposalStatus::Accepted.ensure_transition(ProposalStatus::Accepted);
        assert_matches!(
            result,
            Err(CoreError::InvalidTransition {
                entity: "proposal",
                from: "accepted",
                to: "accepted",
            })
        );
    }

    #[test]
    fn test_rejected_is_terminal() {
        assert!(ProposalStatus::Rejected.allowed_transitions().is_empty());
        assert!(ProposalStatus::Rejected
            .ensure_transition(ProposalStatus::Paid)
            .is_err());
    }

    #[test]
    fn test_cannot_pay_before_accept() {
        assert!(!ProposalStatus::Pending.can_transition(ProposalStatus::Paid));
    }
}
