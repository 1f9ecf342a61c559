//! Velha Game Engine
//!
//! Platform-agnostic core logic for jogo da velha (tic-tac-toe): board and
//! win-line rules, the two opponent policies, score tallies, and a session
//! state machine persisted through a small key-value interface. No UI and
//! no platform-specific storage technology lives in this crate.

pub mod board;
pub mod bot;
pub mod outcome;
pub mod players;
pub mod scores;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use board::{BOARD_CELLS, Board, CellIndexes, Mark, WIN_LINES};
pub use bot::{Difficulty, ParseDifficultyError, choose_move};
pub use outcome::{Outcome, evaluate};
pub use players::{DEFAULT_PLAYER_ONE, DEFAULT_PLAYER_TWO, MAX_NAME_LEN, PlayerNames};
pub use scores::ScoreBoard;
pub use session::{BotTicket, GameSession, MoveOutcome, MoveRejection, SessionConfig};
pub use storage::{
    KEY_DIFFICULTY, KEY_PLAYER_ONE_NAME, KEY_PLAYER_TWO_NAME, KEY_SCORES, KEY_SQUARES,
    KEY_X_IS_NEXT, MemoryStore,
};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Trait for abstracting the flat key-value persistence boundary.
/// Platform-specific implementations should provide this.
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the raw value stored under a key, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a raw value under a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Delete a key, silently succeeding when it was already absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Main engine binding a [`GameSession`] to a persistent store.
///
/// Construction restores whatever the store holds; every applied move writes
/// the board, the turn flag, and the scores back. Restoration never fails:
/// a missing, malformed, or unreadable value falls back to its default.
pub struct GameEngine<S>
where
    S: KeyValueStore,
{
    store: S,
    session: GameSession,
    names: PlayerNames,
}

impl<S> GameEngine<S>
where
    S: KeyValueStore,
{
    /// Create an engine with default session tuning, restoring from the store.
    pub fn new(store: S) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    /// Create an engine with explicit session tuning, restoring from the store.
    pub fn with_config(store: S, config: SessionConfig) -> Self {
        let board: Board = read_key(&store, KEY_SQUARES).unwrap_or_default();
        let x_is_next: bool = read_key(&store, KEY_X_IS_NEXT).unwrap_or(true);
        let scores: ScoreBoard = read_key(&store, KEY_SCORES).unwrap_or_default();
        let difficulty: Difficulty = read_key(&store, KEY_DIFFICULTY).unwrap_or_default();
        let names = PlayerNames {
            player_one: read_key(&store, KEY_PLAYER_ONE_NAME)
                .unwrap_or_else(|| DEFAULT_PLAYER_ONE.to_string()),
            player_two: read_key(&store, KEY_PLAYER_TWO_NAME)
                .unwrap_or_else(|| DEFAULT_PLAYER_TWO.to_string()),
        };
        let session = GameSession::from_parts(board, x_is_next, scores, difficulty, config);
        Self {
            store,
            session,
            names,
        }
    }

    /// Use a deterministic move stream for the easy opponent.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.session = self.session.with_seed(seed);
        self
    }

    /// Place the human mark and persist the mutation when it applies.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted key cannot be written.
    pub fn human_move(&mut self, cell: usize) -> Result<MoveOutcome, S::Error> {
        let moved = self.session.apply_human_move(cell);
        if moved.was_applied() {
            self.persist_game()?;
        }
        Ok(moved)
    }

    /// Arm the opponent's move. Arming writes nothing; only the applied
    /// move does.
    pub fn schedule_bot(&mut self) -> Option<BotTicket> {
        self.session.schedule_bot_move()
    }

    /// Resolve an armed opponent move and persist the mutation when it
    /// applies.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted key cannot be written.
    pub fn resolve_bot(&mut self, ticket: BotTicket) -> Result<MoveOutcome, S::Error> {
        let moved = self.session.resolve_bot_move(ticket);
        if moved.was_applied() {
            self.persist_game()?;
        }
        Ok(moved)
    }

    /// Drop a pending opponent move so its ticket can never apply.
    pub fn cancel_pending(&mut self) -> bool {
        self.session.cancel_pending()
    }

    /// Run the opponent's whole delayed turn: arm, wait, resolve, persist.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted key cannot be written.
    #[cfg(feature = "async")]
    pub async fn bot_turn(&mut self) -> Result<MoveOutcome, S::Error> {
        let moved = self.session.play_bot_turn().await;
        if moved.was_applied() {
            self.persist_game()?;
        }
        Ok(moved)
    }

    /// Start a fresh game, removing the board and turn keys from the store.
    /// The scores key stays.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted key cannot be removed.
    pub fn reset(&mut self) -> Result<(), S::Error> {
        self.session.reset();
        self.store.remove(KEY_SQUARES)?;
        self.store.remove(KEY_X_IS_NEXT)
    }

    /// Zero the score tallies and remove their key. Confirming with the
    /// user first is the caller's duty.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted key cannot be removed.
    pub fn reset_scores(&mut self) -> Result<(), S::Error> {
        self.session.reset_scores();
        self.store.remove(KEY_SCORES)
    }

    /// Apply and persist both submitted display names.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted key cannot be written.
    pub fn set_names(&mut self, player_one: &str, player_two: &str) -> Result<(), S::Error> {
        self.names.set_player_one(player_one);
        self.names.set_player_two(player_two);
        self.persist_names()
    }

    /// Restore and persist the default display names.
    ///
    /// # Errors
    ///
    /// Returns an error if a persisted key cannot be written.
    pub fn reset_names(&mut self) -> Result<(), S::Error> {
        self.names.reset();
        self.persist_names()
    }

    /// Switch opponent strength and persist the token. Nothing else
    /// changes: the running game and the scores stay as they are.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted key cannot be written.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), S::Error> {
        self.session.set_difficulty(difficulty);
        self.store.set(KEY_DIFFICULTY, &encode(&difficulty))
    }

    #[must_use]
    pub const fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        self.session.board()
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.session.outcome()
    }

    #[must_use]
    pub const fn scores(&self) -> &ScoreBoard {
        self.session.scores()
    }

    #[must_use]
    pub const fn names(&self) -> &PlayerNames {
        &self.names
    }

    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.session.difficulty()
    }

    #[must_use]
    pub const fn x_is_next(&self) -> bool {
        self.session.x_is_next()
    }

    #[must_use]
    pub const fn bot_pending(&self) -> bool {
        self.session.bot_pending()
    }

    /// True when a restore landed mid-game on the opponent's turn and the
    /// driving loop should arm the bot.
    #[must_use]
    pub const fn bot_turn_ready(&self) -> bool {
        self.session.bot_turn_ready()
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consume the engine, returning the underlying store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn persist_game(&self) -> Result<(), S::Error> {
        self.store.set(KEY_SQUARES, &encode(self.session.board()))?;
        self.store
            .set(KEY_X_IS_NEXT, &encode(&self.session.x_is_next()))?;
        self.store.set(KEY_SCORES, &encode(self.session.scores()))
    }

    fn persist_names(&self) -> Result<(), S::Error> {
        self.store
            .set(KEY_PLAYER_ONE_NAME, &encode(&self.names.player_one))?;
        self.store
            .set(KEY_PLAYER_TWO_NAME, &encode(&self.names.player_two))
    }
}

fn read_key<S: KeyValueStore, T: DeserializeOwned>(store: &S, key: &str) -> Option<T> {
    let raw = store.get(key).ok().flatten()?;
    serde_json::from_str(&raw).ok()
}

// None of the persisted value shapes can fail to serialize; an empty value
// would restore as absent and fall back to a default.
fn encode<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
