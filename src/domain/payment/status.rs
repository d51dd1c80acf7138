//! Payment intent status with monotonic finality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Canonical status of a payment intent.
///
/// ```text
/// Created ──► Pending ──► Succeeded
///    │           │  ▲
///    │           └──┘ (payload refresh)
///    ├───────────────────► Succeeded
///    └──► Failed ◄── Pending
/// ```
///
/// `Succeeded` and `Failed` are final: no callback may move an intent out of
/// them, whatever order the provider delivers notifications in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Created,
    Pending,
    Succeeded,
    Failed,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::Created => "created",
            IntentStatus::Pending => "pending",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Failed => "failed",
        }
    }

    /// Whether the status can no longer change.
    pub fn is_final(&self) -> bool {
        self.is_terminal()
    }
}

impl StateMachine for IntentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use IntentStatus::*;
        matches!(
            (self, target),
            (Created, Pending)
                | (Created, Succeeded)
                | (Created, Failed)
                | (Pending, Pending)
                | (Pending, Succeeded)
                | (Pending, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use IntentStatus::*;
        match self {
            Created => vec![Pending, Succeeded, Failed],
            Pending => vec![Pending, Succeeded, Failed],
            Succeeded | Failed => vec![],
        }
    }
}

impl fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(IntentStatus::Created),
            "pending" => Ok(IntentStatus::Pending),
            "succeeded" => Ok(IntentStatus::Succeeded),
            "failed" => Ok(IntentStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown intent status '{}'", other),
            )),
        }
    }
}
