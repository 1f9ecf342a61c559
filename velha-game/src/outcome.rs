//! Derived game outcome
use serde::{Deserialize, Serialize};

use crate::board::{Board, Mark};

/// Result of evaluating a board position. Derived from the board on every
/// mutation, never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    InProgress,
    Won(Mark),
    Draw,
}

impl Outcome {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }

    /// Winning mark, when the game has been won.
    #[must_use]
    pub const fn winner(self) -> Option<Mark> {
        match self {
            Self::Won(mark) => Some(mark),
            _ => None,
        }
    }

    /// Stable key for log channels and report rows.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Won(Mark::X) => "win.x",
            Self::Won(Mark::O) => "win.o",
            Self::Draw => "draw",
        }
    }
}

/// Classify a board position. The winner scan runs before the draw check:
/// a full board containing a winning triple is a win, not a draw.
#[must_use]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(mark) = board.winner() {
        return Outcome::Won(mark);
    }
    if board.is_full() {
        return Outcome::Draw;
    }
    Outcome::InProgress
}
