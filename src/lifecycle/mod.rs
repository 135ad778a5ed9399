use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Status of a shift-swap request.
///
/// `PENDING` is the only state a participant can act on. `ACCEPTED` can only
/// move on to `COMPLETED`; the remaining states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl SwapStatus {
    pub const ALL: [SwapStatus; 5] = [
        SwapStatus::Pending,
        SwapStatus::Accepted,
        SwapStatus::Rejected,
        SwapStatus::Cancelled,
        SwapStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::Pending => "PENDING",
            SwapStatus::Accepted => "ACCEPTED",
            SwapStatus::Rejected => "REJECTED",
            SwapStatus::Cancelled => "CANCELLED",
            SwapStatus::Completed => "COMPLETED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        allowed_transitions(*self).is_empty()
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SwapStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown swap status: {}", s))
    }
}

/// The target employee's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapDecision {
    Accepted,
    Rejected,
}

impl From<SwapDecision> for SwapStatus {
    fn from(decision: SwapDecision) -> Self {
        match decision {
            SwapDecision::Accepted => SwapStatus::Accepted,
            SwapDecision::Rejected => SwapStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Illegal swap transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: SwapStatus,
    pub to: SwapStatus,
}

pub fn allowed_transitions(from: SwapStatus) -> &'static [SwapStatus] {
    use SwapStatus::*;
    match from {
        Pending => &[Accepted, Rejected, Cancelled],
        Accepted => &[Completed],
        Rejected | Cancelled | Completed => &[],
    }
}

pub fn validate_transition(from: SwapStatus, to: SwapStatus) -> Result<(), IllegalTransition> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(IllegalTransition { from, to })
    }
}
