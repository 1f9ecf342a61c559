//! Named test scenarios and their pass criteria
use std::fs;
use std::path::Path;

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use velha_game::{
    BOARD_CELLS, Board, Difficulty, GameEngine, KEY_DIFFICULTY, KEY_PLAYER_ONE_NAME, KEY_SQUARES,
    KEY_X_IS_NEXT, KeyValueStore, Mark, MemoryStore, MoveRejection, Outcome, choose_move,
};

use crate::logic::game_tester::{HumanStrategy, SimulationPlan, SimulationSummary};
use crate::store::FileStore;

/// Hand-written check run once per iteration. Gets the iteration seed and
/// the verbose flag, fails by returning an error.
pub type DirectedCheck = fn(u64, bool) -> Result<()>;

#[derive(Debug, Clone)]
pub enum ScenarioPlan {
    /// Full simulated games judged by summary expectations.
    Simulation(SimulationPlan),
    /// A scripted sequence against the engine or the move picker.
    Directed(DirectedCheck),
}

#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: ScenarioPlan,
}

impl TestScenario {
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan: ScenarioPlan::Simulation(plan),
        }
    }

    pub fn directed(name: impl Into<String>, check: DirectedCheck) -> Self {
        Self {
            name: name.into(),
            plan: ScenarioPlan::Directed(check),
        }
    }
}

#[must_use]
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name {
        "smoke" | "engine-smoke" => Some(TestScenario::directed("Engine Smoke", smoke_check)),
        "full-game-easy" | "easy" => Some(TestScenario::simulation(
            "Full Game Easy",
            SimulationPlan::new(Difficulty::Easy, HumanStrategy::Random)
                .with_expectation(expect_terminal)
                .with_expectation(expect_single_score),
        )),
        "full-game-hard" | "hard" => Some(TestScenario::simulation(
            "Full Game Hard",
            SimulationPlan::new(Difficulty::Hard, HumanStrategy::Random)
                .with_expectation(expect_terminal)
                .with_expectation(expect_single_score),
        )),
        "first-empty-draw" | "draw" => Some(TestScenario::simulation(
            "First Empty Draw",
            SimulationPlan::new(Difficulty::Hard, HumanStrategy::FirstEmpty)
                .with_expectation(expect_terminal)
                .with_expectation(expect_draw_in_nine),
        )),
        "mirror-match" | "mirror" => Some(TestScenario::simulation(
            "Mirror Match",
            SimulationPlan::new(Difficulty::Hard, HumanStrategy::Heuristic)
                .with_expectation(expect_terminal)
                .with_expectation(expect_x_wins_in_seven),
        )),
        "hard-bot-threats" | "threats" => {
            Some(TestScenario::directed("Hard Bot Threats", hard_bot_threats))
        }
        "easy-bot-spread" | "spread" => {
            Some(TestScenario::directed("Easy Bot Spread", easy_bot_spread))
        }
        "reset-semantics" | "reset" => {
            Some(TestScenario::directed("Reset Semantics", reset_semantics))
        }
        "persistence-restart" | "persistence" => Some(TestScenario::directed(
            "Persistence Restart",
            persistence_restart,
        )),
        _ => None,
    }
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "One engine round: move, reply, rejection, reset"),
        (
            "full-game-easy",
            "Random human against the easy opponent until the game ends",
        ),
        (
            "full-game-hard",
            "Random human against the hard opponent until the game ends",
        ),
        (
            "first-empty-draw",
            "Hard opponent against a first-empty human always draws in nine moves",
        ),
        (
            "mirror-match",
            "Heuristic against heuristic; the corner double threat wins for X",
        ),
        (
            "hard-bot-threats",
            "Fixed boards: the hard opponent wins first, blocks second",
        ),
        (
            "easy-bot-spread",
            "Distribution check over six hundred easy picks",
        ),
        (
            "reset-semantics",
            "Reset clears the board but keeps the tally",
        ),
        (
            "persistence-restart",
            "A finished game survives a restart from the state file",
        ),
    ]
}

fn expect_terminal(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.outcome != Outcome::InProgress,
        "game stopped without a terminal outcome"
    );
    anyhow::ensure!(
        (5..=9).contains(&summary.moves.len()),
        "a finished game takes five to nine moves, saw {}",
        summary.moves.len()
    );
    anyhow::ensure!(
        summary.final_board.filled_count() == summary.moves.len(),
        "board holds {} marks but {} moves were recorded",
        summary.final_board.filled_count(),
        summary.moves.len()
    );
    Ok(())
}

fn expect_single_score(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.scores.games_played() == 1,
        "exactly one game must be tallied, saw {}",
        summary.scores.games_played()
    );
    let tally_matches = match summary.outcome {
        Outcome::Won(mark) => summary.scores.wins_for(mark) == 1,
        Outcome::Draw => summary.scores.draws == 1,
        Outcome::InProgress => false,
    };
    anyhow::ensure!(
        tally_matches,
        "tally {:?} does not match outcome {}",
        summary.scores,
        summary.outcome.key()
    );
    Ok(())
}

fn expect_draw_in_nine(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.outcome == Outcome::Draw,
        "expected a draw, got {}",
        summary.outcome.key()
    );
    anyhow::ensure!(
        summary.moves.len() == 9,
        "the first-empty line always fills the board, saw {} moves",
        summary.moves.len()
    );
    anyhow::ensure!(summary.scores.draws == 1, "the draw was not tallied");
    Ok(())
}

fn expect_x_wins_in_seven(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.outcome == Outcome::Won(Mark::X),
        "expected X to win the mirror opening, got {}",
        summary.outcome.key()
    );
    anyhow::ensure!(
        summary.moves.len() == 7,
        "the mirror opening ends on move seven, saw {}",
        summary.moves.len()
    );
    anyhow::ensure!(summary.scores.x == 1, "the win was not tallied");
    Ok(())
}

fn board_from(marks: &[(usize, Mark)]) -> Board {
    let mut cells = [None; BOARD_CELLS];
    for &(cell, mark) in marks {
        cells[cell] = Some(mark);
    }
    Board::from_cells(cells)
}

/// One full engine round against the in-memory store.
fn smoke_check(seed: u64, verbose: bool) -> Result<()> {
    let mut engine = GameEngine::new(MemoryStore::new()).with_seed(seed);
    engine.set_names("Ana", "Bot de Teste")?;
    anyhow::ensure!(engine.x_is_next(), "a fresh session must open on X");

    anyhow::ensure!(
        engine.human_move(4)?.was_applied(),
        "opening move was rejected"
    );
    anyhow::ensure!(
        engine.human_move(0)?.rejection() == Some(MoveRejection::BotPending),
        "a second human move in a row must wait for the opponent"
    );
    anyhow::ensure!(
        engine.human_move(4)?.rejection() == Some(MoveRejection::CellOccupied),
        "an occupied cell must be refused before the turn check"
    );

    let Some(ticket) = engine.schedule_bot() else {
        anyhow::bail!("opponent turn never armed");
    };
    anyhow::ensure!(
        engine.resolve_bot(ticket)?.was_applied(),
        "opponent reply was rejected"
    );
    anyhow::ensure!(
        engine.board().filled_count() == 2,
        "expected two marks after one round"
    );
    anyhow::ensure!(engine.x_is_next(), "the turn must come back to X");
    anyhow::ensure!(
        engine.store().get(KEY_SQUARES)?.is_some(),
        "squares key missing after a move"
    );
    anyhow::ensure!(
        engine.store().get(KEY_X_IS_NEXT)?.is_some(),
        "turn key missing after a move"
    );

    engine.reset()?;
    anyhow::ensure!(engine.board().is_empty(), "reset left marks behind");
    anyhow::ensure!(
        engine.store().get(KEY_PLAYER_ONE_NAME)?.is_some(),
        "names must survive a reset"
    );

    if verbose {
        println!("  🔎 smoke round done (seed {seed})");
    }
    Ok(())
}

/// The hard policy on fixed boards: finish a line first, block second,
/// otherwise take the lowest empty cell.
fn hard_bot_threats(seed: u64, verbose: bool) -> Result<()> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);

    // O can finish [0,1,2]; X threatens [6,7,8]. Winning beats blocking.
    let double_threat = board_from(&[
        (0, Mark::O),
        (1, Mark::O),
        (4, Mark::X),
        (6, Mark::X),
        (7, Mark::X),
    ]);
    let pick = choose_move(&double_threat, Mark::O, Difficulty::Hard, &mut rng);
    anyhow::ensure!(
        pick == Some(2),
        "with its own line open the hard pick must be 2, got {pick:?}"
    );

    // No win available: the diagonal threat at 8 must be blocked.
    let lone_threat = board_from(&[(0, Mark::X), (4, Mark::X), (3, Mark::O)]);
    let pick = choose_move(&lone_threat, Mark::O, Difficulty::Hard, &mut rng);
    anyhow::ensure!(
        pick == Some(8),
        "the open diagonal must be blocked at 8, got {pick:?}"
    );

    // Nothing to win or block: lowest empty cell.
    let quiet = board_from(&[(8, Mark::X)]);
    let pick = choose_move(&quiet, Mark::O, Difficulty::Hard, &mut rng);
    anyhow::ensure!(
        pick == Some(0),
        "a quiet board falls back to the first empty cell, got {pick:?}"
    );

    // One hole left: both tiers must find it.
    let one_hole = board_from(&[
        (0, Mark::X),
        (1, Mark::O),
        (2, Mark::X),
        (3, Mark::O),
        (4, Mark::X),
        (6, Mark::O),
        (7, Mark::X),
        (8, Mark::O),
    ]);
    let pick = choose_move(&one_hole, Mark::O, Difficulty::Hard, &mut rng);
    anyhow::ensure!(pick == Some(5), "the last hole is 5, got {pick:?}");
    let pick = choose_move(&one_hole, Mark::O, Difficulty::Easy, &mut rng);
    anyhow::ensure!(pick == Some(5), "the easy pick must also land in 5, got {pick:?}");

    // Full board: no pick at either tier.
    let full = board_from(&[
        (0, Mark::X),
        (1, Mark::O),
        (2, Mark::X),
        (3, Mark::O),
        (4, Mark::X),
        (5, Mark::X),
        (6, Mark::O),
        (7, Mark::X),
        (8, Mark::O),
    ]);
    anyhow::ensure!(
        choose_move(&full, Mark::O, Difficulty::Hard, &mut rng).is_none(),
        "a full board must yield no move"
    );
    anyhow::ensure!(
        choose_move(&full, Mark::O, Difficulty::Easy, &mut rng).is_none(),
        "a full board must yield no random move either"
    );

    if verbose {
        println!("  🧠 threat boards answered correctly (seed {seed})");
    }
    Ok(())
}

/// The easy pick over an empty board should spread across all nine cells.
/// Bounds sit far outside six standard deviations of the uniform mean, so
/// any seed passes unless the draw is genuinely broken.
fn easy_bot_spread(seed: u64, verbose: bool) -> Result<()> {
    const TRIALS: usize = 600;
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let board = Board::new();
    let mut counts = [0usize; BOARD_CELLS];

    for _ in 0..TRIALS {
        let Some(cell) = choose_move(&board, Mark::O, Difficulty::Easy, &mut rng) else {
            anyhow::bail!("easy pick returned no cell on an empty board");
        };
        anyhow::ensure!(cell < BOARD_CELLS, "easy pick {cell} is out of range");
        counts[cell] += 1;
    }

    for (cell, &count) in counts.iter().enumerate() {
        anyhow::ensure!(
            (20..=140).contains(&count),
            "cell {cell} drawn {count} times in {TRIALS}, outside the uniform band"
        );
    }

    if verbose {
        println!("  🎲 spread over {TRIALS} picks: {counts:?}");
    }
    Ok(())
}

/// Plays the corner double threat to a win, then checks what reset keeps
/// and what reset-scores clears.
fn reset_semantics(seed: u64, verbose: bool) -> Result<()> {
    let mut engine = GameEngine::new(MemoryStore::new()).with_seed(seed);
    engine.set_difficulty(Difficulty::Hard)?;

    for cell in [4, 8, 2] {
        anyhow::ensure!(
            engine.human_move(cell)?.was_applied(),
            "human move {cell} was rejected"
        );
        let Some(ticket) = engine.schedule_bot() else {
            anyhow::bail!("opponent turn never armed after cell {cell}");
        };
        anyhow::ensure!(
            engine.resolve_bot(ticket)?.was_applied(),
            "opponent reply after cell {cell} was rejected"
        );
    }
    anyhow::ensure!(
        engine.human_move(6)?.was_applied(),
        "the winning move was rejected"
    );
    anyhow::ensure!(
        engine.outcome() == Outcome::Won(Mark::X),
        "the double threat must win for X, got {:?}",
        engine.outcome()
    );
    anyhow::ensure!(engine.scores().x == 1, "the win was not tallied");
    anyhow::ensure!(
        engine.schedule_bot().is_none(),
        "a finished game must not arm an opponent move"
    );
    anyhow::ensure!(
        engine.human_move(1)?.rejection() == Some(MoveRejection::GameOver),
        "a finished game must refuse further moves"
    );

    engine.reset()?;
    anyhow::ensure!(engine.board().is_empty(), "reset left marks behind");
    anyhow::ensure!(
        engine.outcome() == Outcome::InProgress,
        "reset must reopen the game"
    );
    anyhow::ensure!(engine.x_is_next(), "a fresh game opens on X");
    anyhow::ensure!(engine.scores().x == 1, "reset must keep the tally");

    // A ticket armed before a reset must never apply.
    anyhow::ensure!(
        engine.human_move(4)?.was_applied(),
        "the move after reset was rejected"
    );
    let Some(stale) = engine.schedule_bot() else {
        anyhow::bail!("opponent turn never armed after reset");
    };
    engine.reset()?;
    anyhow::ensure!(
        engine.resolve_bot(stale)?.rejection() == Some(MoveRejection::Superseded),
        "a ticket armed before reset must be superseded"
    );
    anyhow::ensure!(
        engine.board().is_empty(),
        "the stale resolve touched the board"
    );

    anyhow::ensure!(
        engine.human_move(0)?.was_applied(),
        "the follow-up move was rejected"
    );
    engine.reset_scores()?;
    anyhow::ensure!(
        engine.scores().games_played() == 0,
        "reset-scores must clear the tally"
    );
    anyhow::ensure!(
        engine.board().cell(0).is_some(),
        "reset-scores must leave the board alone"
    );
    anyhow::ensure!(
        !engine.x_is_next(),
        "reset-scores must leave the turn flag alone"
    );

    if verbose {
        println!("  ♻️ reset kept the tally, reset-scores cleared it (seed {seed})");
    }
    Ok(())
}

/// Drives a full game against a file-backed store, then restarts from the
/// file and checks the restore. Ends with the damaged-file fallback.
fn persistence_restart(seed: u64, verbose: bool) -> Result<()> {
    let dir = std::env::temp_dir().join(format!(
        "velha-tester-{}-{seed}",
        std::process::id()
    ));
    fs::create_dir_all(&dir)?;
    let result = persistence_restart_in(&dir, seed, verbose);
    let _ = fs::remove_dir_all(&dir);
    result
}

fn persistence_restart_in(dir: &Path, seed: u64, verbose: bool) -> Result<()> {
    let path = dir.join("estado.json");

    {
        let mut engine = GameEngine::new(FileStore::new(&path)).with_seed(seed);
        engine.set_difficulty(Difficulty::Hard)?;
        engine.set_names("Maria", "Robô")?;

        // First-empty human against the hard opponent always fills the board.
        while engine.outcome() == Outcome::InProgress {
            let Some(cell) = engine.board().first_empty() else {
                anyhow::bail!("no empty cell while the game is still open");
            };
            anyhow::ensure!(
                engine.human_move(cell)?.was_applied(),
                "human move {cell} was rejected"
            );
            if engine.outcome() != Outcome::InProgress {
                break;
            }
            let Some(ticket) = engine.schedule_bot() else {
                anyhow::bail!("opponent turn never armed mid-game");
            };
            anyhow::ensure!(
                engine.resolve_bot(ticket)?.was_applied(),
                "opponent reply was rejected mid-game"
            );
        }
        anyhow::ensure!(
            engine.outcome() == Outcome::Draw,
            "the first-empty line must end in a draw, got {:?}",
            engine.outcome()
        );
        anyhow::ensure!(engine.scores().draws == 1, "the draw was not tallied");
    }

    let revived = GameEngine::new(FileStore::new(&path));
    anyhow::ensure!(
        revived.outcome() == Outcome::Draw,
        "restart lost the finished board"
    );
    anyhow::ensure!(revived.board().is_full(), "restart lost board cells");
    anyhow::ensure!(revived.scores().draws == 1, "restart lost the tally");
    anyhow::ensure!(
        revived.names().player_one == "Maria",
        "restart lost the player name, got {:?}",
        revived.names().player_one
    );
    anyhow::ensure!(
        revived.difficulty() == Difficulty::Hard,
        "restart lost the difficulty"
    );

    // A damaged file falls back to defaults; the next write heals it.
    fs::write(&path, "{ not json")?;
    let mut healed = GameEngine::new(FileStore::new(&path));
    anyhow::ensure!(
        healed.board().is_empty(),
        "a damaged file must restore as a fresh board"
    );
    anyhow::ensure!(
        healed.scores().games_played() == 0,
        "a damaged file must restore a zero tally"
    );
    healed.set_difficulty(Difficulty::Easy)?;
    anyhow::ensure!(
        FileStore::new(&path).get(KEY_DIFFICULTY)?.is_some(),
        "the first write must heal the damaged file"
    );

    if verbose {
        println!("  💾 restart restored the draw from {}", path.display());
    }
    Ok(())
}
