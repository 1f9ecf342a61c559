//! Headless deterministic game runner
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use velha_game::{
    BOARD_CELLS, Board, Difficulty, GameSession, Mark, MoveOutcome, Outcome, ScoreBoard,
    SessionConfig, choose_move, evaluate,
};

/// How the simulated human picks a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumanStrategy {
    /// Uniformly random empty cell.
    Random,
    /// Always the lowest-indexed empty cell.
    FirstEmpty,
    /// The same win-block-fallback policy the hard opponent plays.
    Heuristic,
}

impl HumanStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::FirstEmpty => "first-empty",
            Self::Heuristic => "heuristic",
        }
    }

    fn choose<R: Rng>(self, board: &Board, rng: &mut R) -> Option<usize> {
        match self {
            Self::Random => choose_move(board, Mark::X, Difficulty::Easy, rng),
            Self::FirstEmpty => board.first_empty(),
            Self::Heuristic => choose_move(board, Mark::X, Difficulty::Hard, rng),
        }
    }
}

/// Assertion hook run after a simulated game completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Declarative plan for one simulated game.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub difficulty: Difficulty,
    pub strategy: HumanStrategy,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(difficulty: Difficulty, strategy: HumanStrategy) -> Self {
        Self {
            difficulty,
            strategy,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveActor {
    Human,
    Bot,
}

impl MoveActor {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Bot => "bot",
        }
    }
}

/// One applied move in a simulated game.
#[derive(Debug, Clone, Copy)]
pub struct MoveRecord {
    pub number: usize,
    pub actor: MoveActor,
    pub cell: usize,
    pub outcome: Outcome,
}

/// Complete record of a simulated game. `violations` collects every turn
/// invariant the run broke; a clean run leaves it empty.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub difficulty: Difficulty,
    pub strategy: HumanStrategy,
    pub moves: Vec<MoveRecord>,
    pub violations: Vec<String>,
    pub final_board: Board,
    pub outcome: Outcome,
    pub scores: ScoreBoard,
    pub logs: Vec<String>,
}

/// Headless deterministic runner for the core game logic.
#[derive(Debug, Clone, Copy)]
pub struct GameTester {
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    #[must_use]
    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    /// Play one full game under the plan's strategy and difficulty, checking
    /// the turn-cycle invariants after every applied move.
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let mut session = GameSession::new(SessionConfig::default()).with_seed(seed);
        session.set_difficulty(plan.difficulty);
        let mut human_rng = ChaCha20Rng::seed_from_u64(seed);

        let mut moves: Vec<MoveRecord> = Vec::new();
        let mut violations: Vec<String> = Vec::new();

        while !session.outcome().is_terminal() {
            let number = moves.len() + 1;
            if number > BOARD_CELLS {
                violations.push(format!(
                    "game ran past {BOARD_CELLS} moves without reaching a terminal state"
                ));
                break;
            }

            let filled_before = session.board().filled_count();
            let scores_before = *session.scores();
            let human_turn = session.x_is_next();

            let (actor, moved) = if human_turn {
                let Some(cell) = plan.strategy.choose(session.board(), &mut human_rng) else {
                    violations.push(format!(
                        "{} strategy found no cell on a live board",
                        plan.strategy.label()
                    ));
                    break;
                };
                (MoveActor::Human, session.apply_human_move(cell))
            } else {
                let Some(ticket) = session.schedule_bot_move() else {
                    violations.push(String::from(
                        "bot turn was not ready on the opponent's half of the cycle",
                    ));
                    break;
                };
                (MoveActor::Bot, session.resolve_bot_move(ticket))
            };

            let MoveOutcome::Applied { cell, outcome } = moved else {
                violations.push(format!(
                    "move {number} by the {} was rejected: {:?}",
                    actor.as_str(),
                    moved.rejection()
                ));
                break;
            };

            check_turn_invariants(
                &session,
                filled_before,
                scores_before,
                human_turn,
                number,
                &mut violations,
            );

            if self.verbose {
                println!(
                    "  🎯 move {number}: {} -> cell {cell} [{}]",
                    actor.as_str(),
                    outcome.key()
                );
            }

            moves.push(MoveRecord {
                number,
                actor,
                cell,
                outcome,
            });
        }

        let summary = SimulationSummary {
            seed,
            difficulty: plan.difficulty,
            strategy: plan.strategy,
            moves,
            violations,
            final_board: session.board().clone(),
            outcome: session.outcome(),
            scores: *session.scores(),
            logs: session.logs().to_vec(),
        };

        if self.verbose {
            println!(
                "  🏁 {} after {} moves (seed {seed}, strategy {}, difficulty {})",
                summary.outcome.key(),
                summary.moves.len(),
                summary.strategy.label(),
                summary.difficulty
            );
            if let Some(tail) = summary.logs.last() {
                println!("  🧾 {} log entries, last: {tail}", summary.logs.len());
            }
        }
        log::debug!(
            "run_plan seed={seed} strategy={} difficulty={} moves={} outcome={}",
            summary.strategy.label(),
            summary.difficulty,
            summary.moves.len(),
            summary.outcome.key()
        );

        summary
    }
}

fn check_turn_invariants(
    session: &GameSession,
    filled_before: usize,
    scores_before: ScoreBoard,
    human_moved: bool,
    number: usize,
    violations: &mut Vec<String>,
) {
    let filled = session.board().filled_count();
    if filled != filled_before + 1 {
        violations.push(format!(
            "move {number} changed the filled-cell count from {filled_before} to {filled}"
        ));
    }

    if session.x_is_next() == human_moved {
        violations.push(format!(
            "move {number} left the turn flag on the mover's side"
        ));
    }

    if evaluate(session.board()) != session.outcome() {
        violations.push(format!("move {number} left a stale outcome for the board"));
    }

    let scores = *session.scores();
    if session.outcome().is_terminal() {
        if scores.games_played() != scores_before.games_played() + 1 {
            violations.push(format!(
                "terminal move {number} did not score exactly one game"
            ));
        }
    } else if scores != scores_before {
        violations.push(format!("move {number} changed the scores mid-game"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_plan(difficulty: Difficulty, strategy: HumanStrategy) -> SimulationPlan {
        SimulationPlan::new(difficulty, strategy)
    }

    #[test]
    fn easy_random_game_finishes_cleanly() {
        let tester = GameTester::new(false);
        let summary = tester.run_plan(&base_plan(Difficulty::Easy, HumanStrategy::Random), 1337);

        assert!(summary.outcome.is_terminal());
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert!((5..=9).contains(&summary.moves.len()));
        assert_eq!(summary.scores.games_played(), 1);
    }

    #[test]
    fn hard_versus_first_empty_is_the_known_draw() {
        let tester = GameTester::new(false);
        let summary = tester.run_plan(&base_plan(Difficulty::Hard, HumanStrategy::FirstEmpty), 7);

        assert_eq!(summary.outcome, Outcome::Draw);
        assert_eq!(summary.moves.len(), 9);
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert_eq!(summary.scores.draws, 1);
    }

    #[test]
    fn heuristic_human_beats_the_hard_bot() {
        // Both sides are deterministic: the human builds the 2-4-6 double
        // threat off the lowest-cell openings and wins on move seven.
        let tester = GameTester::new(false);
        let summary = tester.run_plan(&base_plan(Difficulty::Hard, HumanStrategy::Heuristic), 42);

        assert_eq!(summary.outcome, Outcome::Won(Mark::X));
        assert_eq!(summary.moves.len(), 7);
        assert!(summary.violations.is_empty(), "{:?}", summary.violations);
        assert_eq!(summary.scores.x, 1);
    }

    #[test]
    fn same_seed_replays_the_same_random_game() {
        let tester = GameTester::new(false);
        let plan = base_plan(Difficulty::Easy, HumanStrategy::Random);
        let first = tester.run_plan(&plan, 99);
        let second = tester.run_plan(&plan, 99);

        assert_eq!(first.final_board, second.final_board);
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(first.moves.len(), second.moves.len());
    }

    #[test]
    fn expectations_evaluate_against_the_summary() {
        let tester = GameTester::new(false);
        let plan = base_plan(Difficulty::Hard, HumanStrategy::FirstEmpty)
            .with_expectation(|summary: &SimulationSummary| {
                anyhow::ensure!(summary.outcome == Outcome::Draw, "expected a draw");
                Ok(())
            });
        let summary = tester.run_plan(&plan, 3);

        assert_eq!(plan.expectations.len(), 1);
        assert!(plan.expectations[0].evaluate(&summary).is_ok());
    }

    #[test]
    fn strategy_labels_are_stable() {
        assert_eq!(HumanStrategy::Random.label(), "random");
        assert_eq!(HumanStrategy::FirstEmpty.label(), "first-empty");
        assert_eq!(HumanStrategy::Heuristic.label(), "heuristic");
    }
}
