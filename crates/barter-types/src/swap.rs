//! Swap-request lifecycle.
//!
//! `pending` is the only state with outgoing edges. Accept and reject belong
//! to the receiver, cancel to the requester (see [`crate::policy`]).

use std::fmt;

use thiserror::Error;

use crate::models::SwapStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapAction {
    Accept,
    Reject,
    Cancel,
}

impl SwapAction {
    /// State the request ends up in once the action is applied.
    pub fn target(self) -> SwapStatus {
        match self {
            SwapAction::Accept => SwapStatus::Accepted,
            SwapAction::Reject => SwapStatus::Rejected,
            SwapAction::Cancel => SwapStatus::Cancelled,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            SwapAction::Accept => "accept",
            SwapAction::Reject => "reject",
            SwapAction::Cancel => "cancel",
        }
    }

    /// Audit-log action name.
    pub fn log_action(self) -> &'static str {
        match self {
            SwapAction::Accept => "SWAP_ACCEPT",
            SwapAction::Reject => "SWAP_REJECT",
            SwapAction::Cancel => "SWAP_CANCEL",
        }
    }
}

impl fmt::Display for SwapAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Only pending swap requests can be {}. This request is already {current}.", .action.target())]
pub struct TransitionError {
    pub current: SwapStatus,
    pub action: SwapAction,
}

impl SwapStatus {
    pub fn is_terminal(self) -> bool {
        self != SwapStatus::Pending
    }

    /// Apply `action` to a request currently in `self`.
    pub fn apply(self, action: SwapAction) -> Result<SwapStatus, TransitionError> {
        match self {
            SwapStatus::Pending => Ok(action.target()),
            current => Err(TransitionError { current, action }),
        }
    }
}
