//! Player display names
use serde::{Deserialize, Serialize};

/// Longest accepted display name, in characters.
pub const MAX_NAME_LEN: usize = 12;

/// Default name shown for the human side.
pub const DEFAULT_PLAYER_ONE: &str = "X";

/// Default name shown for the opponent side.
pub const DEFAULT_PLAYER_TWO: &str = "O";

/// Display names for the two sides. Decoupled from the marks placed on the
/// board; each name persists under its own storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerNames {
    pub player_one: String,
    pub player_two: String,
}

impl Default for PlayerNames {
    fn default() -> Self {
        Self {
            player_one: DEFAULT_PLAYER_ONE.to_string(),
            player_two: DEFAULT_PLAYER_TWO.to_string(),
        }
    }
}

impl PlayerNames {
    /// Apply a submitted name for the human side. Blank input falls back to
    /// the default, anything longer than [`MAX_NAME_LEN`] is truncated.
    pub fn set_player_one(&mut self, input: &str) {
        self.player_one = sanitize(input, DEFAULT_PLAYER_ONE);
    }

    /// Apply a submitted name for the opponent side.
    pub fn set_player_two(&mut self, input: &str) {
        self.player_two = sanitize(input, DEFAULT_PLAYER_TWO);
    }

    /// Restore both defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn sanitize(input: &str, fallback: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}
