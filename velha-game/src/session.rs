//! Game session state machine
//!
//! A session owns the board, the turn flag, the score tallies, and the
//! pending-opponent-move bookkeeping. Every mutation re-derives the outcome
//! through [`evaluate`], and a game is scored exactly once, on the move that
//! carried it from in-progress to terminal. Illegal move attempts are
//! rejected quietly through [`MoveOutcome`] rather than surfaced as errors.
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Mark};
use crate::bot::{Difficulty, choose_move};
use crate::outcome::{Outcome, evaluate};
use crate::scores::ScoreBoard;

pub const LOG_MOVE_HUMAN: &str = "log.move.human";
pub const LOG_MOVE_BOT: &str = "log.move.bot";
pub const LOG_WIN_X: &str = "log.win.x";
pub const LOG_WIN_O: &str = "log.win.o";
pub const LOG_DRAW: &str = "log.draw";
pub const LOG_RESET: &str = "log.reset";
pub const LOG_SCORES_RESET: &str = "log.scores.reset";
pub const LOG_BOT_ARMED: &str = "log.bot.armed";
pub const LOG_BOT_CANCELLED: &str = "log.bot.cancelled";

/// Oldest entries fall off once the event log reaches this many keys.
const MAX_LOG_ENTRIES: usize = 64;

/// Session tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Delay between arming the opponent's move and resolving it.
    #[serde(default = "SessionConfig::default_bot_delay_ms")]
    pub bot_delay_ms: u64,
}

impl SessionConfig {
    const fn default_bot_delay_ms() -> u64 {
        500
    }

    #[must_use]
    pub const fn bot_delay(&self) -> Duration {
        Duration::from_millis(self.bot_delay_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bot_delay_ms: Self::default_bot_delay_ms(),
        }
    }
}

/// Why a move attempt was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The target cell already holds a mark.
    CellOccupied,
    /// The game reached a terminal state and has not been reset.
    GameOver,
    /// It is the opponent's half of the turn cycle.
    BotPending,
    /// The ticket no longer matches the session it was issued for.
    Superseded,
}

/// Result of a move attempt. Rejections carry no state change at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Applied { cell: usize, outcome: Outcome },
    Rejected(MoveRejection),
}

impl MoveOutcome {
    #[must_use]
    pub const fn was_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    #[must_use]
    pub const fn rejection(&self) -> Option<MoveRejection> {
        match self {
            Self::Applied { .. } => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

/// Handle for a pending opponent move, stamped with the session generation
/// at arming time. A ticket issued before any later board change resolves
/// to [`MoveRejection::Superseded`] instead of writing to the new board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotTicket {
    generation: u64,
}

/// One game of velha plus the tallies that outlive it.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    x_is_next: bool,
    outcome: Outcome,
    scores: ScoreBoard,
    difficulty: Difficulty,
    config: SessionConfig,
    pending_bot: bool,
    generation: u64,
    logs: Vec<String>,
    rng: ChaCha20Rng,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl GameSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::from_parts(
            Board::new(),
            true,
            ScoreBoard::default(),
            Difficulty::default(),
            config,
        )
    }

    /// Rebuild a session from restored parts. The outcome is re-derived from
    /// the board; a terminal board restores as terminal without touching the
    /// scores, which were already counted when the game finished.
    #[must_use]
    pub fn from_parts(
        board: Board,
        x_is_next: bool,
        scores: ScoreBoard,
        difficulty: Difficulty,
        config: SessionConfig,
    ) -> Self {
        let outcome = evaluate(&board);
        Self {
            board,
            x_is_next,
            outcome,
            scores,
            difficulty,
            config,
            pending_bot: false,
            generation: 0,
            logs: Vec::new(),
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Use a deterministic move stream for the easy opponent.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
        self
    }

    /// Place the human mark into the given cell. Rejections follow the same
    /// precedence the click handler always had: finished game first, then
    /// occupied cell, then the opponent's turn.
    pub fn apply_human_move(&mut self, cell: usize) -> MoveOutcome {
        if self.outcome.is_terminal() {
            return MoveOutcome::Rejected(MoveRejection::GameOver);
        }
        if self.board.cell(cell).is_some() {
            return MoveOutcome::Rejected(MoveRejection::CellOccupied);
        }
        if !self.x_is_next {
            return MoveOutcome::Rejected(MoveRejection::BotPending);
        }
        self.apply_move(cell, Mark::X, LOG_MOVE_HUMAN)
    }

    /// Arm the opponent's move and hand back a ticket for resolving it.
    /// Returns `None` unless it is the opponent's turn of a live game and
    /// nothing is pending already.
    pub fn schedule_bot_move(&mut self) -> Option<BotTicket> {
        if !self.bot_turn_ready() {
            return None;
        }
        self.pending_bot = true;
        self.push_log(LOG_BOT_ARMED);
        Some(BotTicket {
            generation: self.generation,
        })
    }

    /// Resolve a previously armed opponent move. A ticket that no longer
    /// matches the current generation, or arrives when nothing is pending,
    /// is rejected without touching the board.
    pub fn resolve_bot_move(&mut self, ticket: BotTicket) -> MoveOutcome {
        if !self.pending_bot || ticket.generation != self.generation {
            return MoveOutcome::Rejected(MoveRejection::Superseded);
        }
        self.pending_bot = false;
        let Some(cell) = choose_move(&self.board, Mark::O, self.difficulty, &mut self.rng) else {
            return MoveOutcome::Rejected(MoveRejection::GameOver);
        };
        self.apply_move(cell, Mark::O, LOG_MOVE_BOT)
    }

    /// Drop a pending opponent move so its ticket can never apply.
    pub fn cancel_pending(&mut self) -> bool {
        if !self.pending_bot {
            return false;
        }
        self.pending_bot = false;
        self.generation += 1;
        self.push_log(LOG_BOT_CANCELLED);
        true
    }

    /// Arm, wait out the configured delay, then resolve. A reset or cancel
    /// issued while the delay runs supersedes the ticket. If the returned
    /// future is dropped mid-delay the armed move stays pending; call
    /// [`Self::cancel_pending`] to release it.
    #[cfg(feature = "async")]
    pub async fn play_bot_turn(&mut self) -> MoveOutcome {
        let Some(ticket) = self.schedule_bot_move() else {
            return MoveOutcome::Rejected(MoveRejection::Superseded);
        };
        tokio::time::sleep(self.config.bot_delay()).await;
        self.resolve_bot_move(ticket)
    }

    /// Clear the board and turn flag for a fresh game. Scores survive; a
    /// pending opponent move does not.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.x_is_next = true;
        self.outcome = Outcome::InProgress;
        self.pending_bot = false;
        self.generation += 1;
        self.push_log(LOG_RESET);
    }

    /// Zero the score tallies. The board and turn flag are untouched;
    /// confirming with the user first is the caller's duty.
    pub fn reset_scores(&mut self) {
        self.scores.reset();
        self.push_log(LOG_SCORES_RESET);
    }

    pub const fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    /// True when the opponent should take its turn: a live game, the turn
    /// flag on the opponent's side, and no move armed yet. Also the signal
    /// to re-arm after a restore landed mid-game on the opponent's turn.
    #[must_use]
    pub const fn bot_turn_ready(&self) -> bool {
        !self.outcome.is_terminal() && !self.x_is_next && !self.pending_bot
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub const fn x_is_next(&self) -> bool {
        self.x_is_next
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub const fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub const fn bot_pending(&self) -> bool {
        self.pending_bot
    }

    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    fn apply_move(&mut self, cell: usize, mark: Mark, log_key: &'static str) -> MoveOutcome {
        if !self.board.place(cell, mark) {
            return MoveOutcome::Rejected(MoveRejection::CellOccupied);
        }
        self.x_is_next = !self.x_is_next;
        self.generation += 1;
        self.push_log(log_key);

        self.outcome = evaluate(&self.board);
        if self.outcome.is_terminal() {
            self.scores.record(self.outcome);
            match self.outcome {
                Outcome::Won(Mark::X) => self.push_log(LOG_WIN_X),
                Outcome::Won(Mark::O) => self.push_log(LOG_WIN_O),
                Outcome::Draw => self.push_log(LOG_DRAW),
                Outcome::InProgress => {}
            }
        }
        MoveOutcome::Applied {
            cell,
            outcome: self.outcome,
        }
    }

    fn push_log(&mut self, key: &str) {
        if self.logs.len() == MAX_LOG_ENTRIES {
            self.logs.remove(0);
        }
        self.logs.push(String::from(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(SessionConfig::default()).with_seed(1)
    }

    fn play_bot(session: &mut GameSession) -> MoveOutcome {
        let ticket = session.schedule_bot_move().expect("bot turn ready");
        session.resolve_bot_move(ticket)
    }

    #[test]
    fn human_move_places_x_and_flips_turn() {
        let mut session = session();
        let outcome = session.apply_human_move(4);
        assert!(outcome.was_applied());
        assert_eq!(session.board().cell(4), Some(Mark::X));
        assert!(!session.x_is_next());
        assert_eq!(session.outcome(), Outcome::InProgress);
        assert_eq!(session.logs(), &[LOG_MOVE_HUMAN.to_string()]);
    }

    #[test]
    fn occupied_cell_is_rejected_before_turn_check() {
        let mut session = session();
        assert!(session.apply_human_move(4).was_applied());
        let outcome = session.apply_human_move(4);
        assert_eq!(outcome.rejection(), Some(MoveRejection::CellOccupied));
        assert_eq!(session.board().filled_count(), 1);
    }

    #[test]
    fn human_cannot_move_on_the_bot_turn() {
        let mut session = session();
        assert!(session.apply_human_move(0).was_applied());
        let outcome = session.apply_human_move(1);
        assert_eq!(outcome.rejection(), Some(MoveRejection::BotPending));
    }

    #[test]
    fn bot_resolves_on_its_turn_and_hands_back_the_flag() {
        let mut session = session();
        assert!(session.apply_human_move(0).was_applied());
        assert!(session.bot_turn_ready());

        let outcome = play_bot(&mut session);
        assert!(outcome.was_applied());
        assert!(session.x_is_next());
        assert!(!session.bot_pending());
        assert_eq!(session.board().filled_count(), 2);
    }

    #[test]
    fn schedule_requires_the_bot_turn() {
        let mut session = session();
        assert!(session.schedule_bot_move().is_none());

        assert!(session.apply_human_move(0).was_applied());
        let first = session.schedule_bot_move();
        assert!(first.is_some());
        assert!(session.schedule_bot_move().is_none());
    }

    #[test]
    fn stale_ticket_after_reset_is_superseded() {
        let mut session = session();
        assert!(session.apply_human_move(0).was_applied());
        let ticket = session.schedule_bot_move().expect("bot turn ready");

        session.reset();
        let outcome = session.resolve_bot_move(ticket);
        assert_eq!(outcome.rejection(), Some(MoveRejection::Superseded));
        assert!(session.board().is_empty());
        assert!(session.x_is_next());
    }

    #[test]
    fn cancelled_ticket_cannot_resolve_against_a_rearmed_bot() {
        let mut session = session();
        assert!(session.apply_human_move(0).was_applied());
        let stale = session.schedule_bot_move().expect("bot turn ready");
        assert!(session.cancel_pending());

        let fresh = session.schedule_bot_move().expect("still the bot turn");
        assert_eq!(
            session.resolve_bot_move(stale).rejection(),
            Some(MoveRejection::Superseded)
        );
        assert!(session.resolve_bot_move(fresh).was_applied());
    }

    #[test]
    fn resolving_twice_rejects_the_second_attempt() {
        let mut session = session();
        assert!(session.apply_human_move(0).was_applied());
        let ticket = session.schedule_bot_move().expect("bot turn ready");
        assert!(session.resolve_bot_move(ticket).was_applied());
        assert_eq!(
            session.resolve_bot_move(ticket).rejection(),
            Some(MoveRejection::Superseded)
        );
    }

    #[test]
    fn cancel_without_pending_is_a_no_op() {
        let mut session = session();
        assert!(!session.cancel_pending());
        assert!(session.logs().is_empty());
    }

    /// Beat the hard bot with the double threat it cannot foresee:
    /// X 4, O 0 (fallback), X 8, O 1 (fallback), X 2 (threatens 5 and 6),
    /// O 5 (blocks the first threat found), X 6 wins on the diagonal.
    fn play_human_win_against_hard(session: &mut GameSession) -> MoveOutcome {
        session.set_difficulty(Difficulty::Hard);
        for cell in [4, 8, 2] {
            assert!(session.apply_human_move(cell).was_applied());
            assert!(play_bot(session).was_applied());
        }
        session.apply_human_move(6)
    }

    #[test]
    fn winning_move_scores_once_and_freezes_the_session() {
        let mut session = session();
        let finishing = play_human_win_against_hard(&mut session);

        assert_eq!(session.outcome(), Outcome::Won(Mark::X));
        assert!(matches!(
            finishing,
            MoveOutcome::Applied {
                cell: 6,
                outcome: Outcome::Won(Mark::X)
            }
        ));
        assert_eq!(session.scores().x, 1);
        assert_eq!(session.scores().games_played(), 1);

        // Turn flag froze after the terminal flip; no further moves land.
        assert!(!session.x_is_next());
        assert_eq!(
            session.apply_human_move(5).rejection(),
            Some(MoveRejection::GameOver)
        );
        assert!(session.schedule_bot_move().is_none());
        assert_eq!(session.scores().x, 1);
        assert!(session.logs().contains(&LOG_WIN_X.to_string()));
    }

    #[test]
    fn reset_clears_the_game_but_keeps_scores() {
        let mut session = session();
        assert!(play_human_win_against_hard(&mut session).was_applied());
        assert_eq!(session.scores().x, 1);

        session.reset();
        assert!(session.board().is_empty());
        assert!(session.x_is_next());
        assert_eq!(session.outcome(), Outcome::InProgress);
        assert_eq!(session.scores().x, 1);
    }

    #[test]
    fn reset_scores_keeps_the_board() {
        let mut session = session();
        assert!(session.apply_human_move(4).was_applied());
        session.reset_scores();
        assert_eq!(session.scores().games_played(), 0);
        assert_eq!(session.board().cell(4), Some(Mark::X));
        assert!(!session.x_is_next());
    }

    #[test]
    fn restored_terminal_board_is_terminal_but_not_rescored() {
        let mut board = Board::new();
        for index in [0, 1, 2] {
            assert!(board.place(index, Mark::X));
        }
        assert!(board.place(3, Mark::O));
        assert!(board.place(4, Mark::O));

        let scores = ScoreBoard { x: 1, o: 0, draws: 0 };
        let session = GameSession::from_parts(
            board,
            false,
            scores,
            Difficulty::Easy,
            SessionConfig::default(),
        );
        assert_eq!(session.outcome(), Outcome::Won(Mark::X));
        assert_eq!(session.scores().x, 1);
        assert!(!session.bot_turn_ready());
    }

    #[test]
    fn restore_on_the_bot_turn_reports_ready() {
        let mut board = Board::new();
        assert!(board.place(4, Mark::X));
        let session = GameSession::from_parts(
            board,
            false,
            ScoreBoard::default(),
            Difficulty::Easy,
            SessionConfig::default(),
        );
        assert!(session.bot_turn_ready());
    }

    #[test]
    fn draw_game_scores_the_draw_counter() {
        let mut session = session();
        session.set_difficulty(Difficulty::Hard);
        // Against the deterministic hard bot this human line fills the
        // board with no winner: O answers 1, 8, 6, 3 along the way.
        for cell in [0, 4, 2, 7] {
            assert!(session.apply_human_move(cell).was_applied());
            assert!(play_bot(&mut session).was_applied());
        }
        let finishing = session.apply_human_move(5);

        assert!(finishing.was_applied());
        assert_eq!(session.outcome(), Outcome::Draw);
        assert_eq!(session.scores().draws, 1);
        assert!(session.logs().contains(&LOG_DRAW.to_string()));
    }

    #[test]
    fn log_ring_drops_oldest_entries() {
        let mut session = session();
        for _ in 0..40 {
            assert!(session.apply_human_move(0).was_applied());
            session.reset();
        }
        assert_eq!(session.logs().len(), MAX_LOG_ENTRIES);
        assert_eq!(session.logs().last(), Some(&LOG_RESET.to_string()));
    }

    #[test]
    fn easy_bot_with_fixed_seed_is_reproducible() {
        let mut first = GameSession::new(SessionConfig::default()).with_seed(99);
        let mut second = GameSession::new(SessionConfig::default()).with_seed(99);
        for session in [&mut first, &mut second] {
            assert!(session.apply_human_move(4).was_applied());
        }
        let a = play_bot(&mut first);
        let b = play_bot(&mut second);
        assert_eq!(a, b);
        assert_eq!(first.board(), second.board());
    }
}
