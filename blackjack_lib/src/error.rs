use crate::player::Action;
use std::fmt::Display;
use thiserror::Error;

/// The engine step that rejected a request: a hand action chosen by a player, or one of the
/// round steps driven by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Hand(Action),
    Bet,
    DealerPlay,
    Settle,
}

impl From<Action> for Operation {
    fn from(action: Action) -> Self {
        Operation::Hand(action)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Hand(action) => write!(f, "{}", action),
            Operation::Bet => write!(f, "bet"),
            Operation::DealerPlay => write!(f, "dealer play"),
            Operation::Settle => write!(f, "settle"),
        }
    }
}

/// Errors produced by the blackjack engine.
///
/// `IllegalAction` is the only recoverable variant, a front end is expected to re-prompt the player
/// when it sees one. The other two variants indicate a setup bug and should end the current process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackjackGameError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("shoe exhausted: {dealt} of {total} cards already dealt")]
    ShoeExhausted { dealt: usize, total: usize },
    #[error("illegal action '{operation}': {reason}")]
    IllegalAction {
        operation: Operation,
        reason: &'static str,
    },
}

impl BlackjackGameError {
    /// Convenience constructor for `BlackjackGameError::IllegalAction`.
    pub fn illegal(operation: impl Into<Operation>, reason: &'static str) -> Self {
        BlackjackGameError::IllegalAction {
            operation: operation.into(),
            reason,
        }
    }

    /// Returns true if the error was caused by an action the player may simply retry differently.
    pub fn is_illegal_action(&self) -> bool {
        matches!(self, BlackjackGameError::IllegalAction { .. })
    }
}

pub type Result<T> = std::result::Result<T, BlackjackGameError>;
