//! Opponent move selection policies
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, Mark, WIN_LINES};

/// Opponent strength. Serialized with the tokens the storage layer has
/// always used, so existing saves keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    #[serde(rename = "fácil")]
    Easy,
    #[serde(rename = "difícil")]
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized difficulty token: {0}")]
pub struct ParseDifficultyError(String);

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "fácil",
            Self::Hard => "difícil",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fácil" | "facil" | "easy" => Ok(Self::Easy),
            "difícil" | "dificil" | "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// Pick the next cell for `mark` under the given difficulty. Returns `None`
/// only when the board has no empty cell; callers keep that from happening
/// by checking for a terminal outcome first.
pub fn choose_move<R: Rng>(
    board: &Board,
    mark: Mark,
    difficulty: Difficulty,
    rng: &mut R,
) -> Option<usize> {
    match difficulty {
        Difficulty::Easy => random_move(board, rng),
        Difficulty::Hard => heuristic_move(board, mark),
    }
}

/// Uniformly random choice among the empty cells.
fn random_move<R: Rng>(board: &Board, rng: &mut R) -> Option<usize> {
    let open = board.empty_cells();
    open.choose(rng).copied()
}

/// One-ply heuristic: complete an own triple, else block the opponent's,
/// else take the lowest-indexed empty cell. Deliberately no lookahead
/// beyond the immediate win/block, so a double threat still beats it.
fn heuristic_move(board: &Board, mark: Mark) -> Option<usize> {
    completing_cell(board, mark)
        .or_else(|| completing_cell(board, mark.opponent()))
        .or_else(|| board.first_empty())
}

/// The empty cell that would complete a winning triple for `mark`, scanning
/// each line's three rotations in a fixed order so ties resolve identically
/// on every run.
fn completing_cell(board: &Board, mark: Mark) -> Option<usize> {
    for [a, b, c] in WIN_LINES {
        if board.cell(a) == Some(mark) && board.cell(b) == Some(mark) && board.cell(c).is_none() {
            return Some(c);
        }
        if board.cell(a) == Some(mark) && board.cell(c) == Some(mark) && board.cell(b).is_none() {
            return Some(b);
        }
        if board.cell(b) == Some(mark) && board.cell(c) == Some(mark) && board.cell(a).is_none() {
            return Some(a);
        }
    }
    None
}
