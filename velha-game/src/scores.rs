//! Score tallies carried across games
use serde::{Deserialize, Serialize};

use crate::board::Mark;
use crate::outcome::Outcome;

/// Win and draw counters. Serializes as `{"X": n, "O": n, "Draws": n}`,
/// the shape the storage layer persists; missing fields restore as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    #[serde(rename = "X", default)]
    pub x: u32,
    #[serde(rename = "O", default)]
    pub o: u32,
    #[serde(rename = "Draws", default)]
    pub draws: u32,
}

impl ScoreBoard {
    /// Count a finished game once. An in-progress outcome changes nothing.
    pub const fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Won(Mark::X) => self.x += 1,
            Outcome::Won(Mark::O) => self.o += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::InProgress => {}
        }
    }

    /// Wins credited to the given mark.
    #[must_use]
    pub const fn wins_for(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.x,
            Mark::O => self.o,
        }
    }

    #[must_use]
    pub const fn games_played(&self) -> u32 {
        self.x + self.o + self.draws
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
