//! Restore behavior of the engine against seeded and damaged stores.

use velha_game::{
    Difficulty, GameEngine, KEY_DIFFICULTY, KEY_PLAYER_ONE_NAME, KEY_PLAYER_TWO_NAME, KEY_SCORES,
    KEY_SQUARES, KEY_X_IS_NEXT, Mark, MemoryStore, MoveRejection, Outcome,
};

fn seeded_store(entries: &[(&str, &str)]) -> MemoryStore {
    let store = MemoryStore::new();
    for (key, value) in entries {
        store.insert_raw(key, value);
    }
    store
}

#[test]
fn seeded_store_restores_the_full_session() {
    let store = seeded_store(&[
        (KEY_SQUARES, r#"["X",null,null,null,"O",null,null,null,null]"#),
        (KEY_X_IS_NEXT, "true"),
        (KEY_SCORES, r#"{"X":2,"O":1,"Draws":3}"#),
        (KEY_DIFFICULTY, "\"difícil\""),
        (KEY_PLAYER_ONE_NAME, "\"Ana\""),
        (KEY_PLAYER_TWO_NAME, "\"Beto\""),
        ("tema", "\"escuro\""),
    ]);

    let engine = GameEngine::new(store);
    assert_eq!(engine.board().cell(0), Some(Mark::X));
    assert_eq!(engine.board().cell(4), Some(Mark::O));
    assert_eq!(engine.board().filled_count(), 2);
    assert!(engine.x_is_next());
    assert_eq!(engine.outcome(), Outcome::InProgress);
    assert_eq!(engine.scores().x, 2);
    assert_eq!(engine.scores().o, 1);
    assert_eq!(engine.scores().draws, 3);
    assert_eq!(engine.difficulty(), Difficulty::Hard);
    assert_eq!(engine.names().player_one, "Ana");
    assert_eq!(engine.names().player_two, "Beto");
}

#[test]
fn restore_on_the_bot_turn_arms_and_plays_through() {
    let store = seeded_store(&[
        (KEY_SQUARES, r#"["X",null,null,null,null,null,null,null,null]"#),
        (KEY_X_IS_NEXT, "false"),
        (KEY_DIFFICULTY, "\"difícil\""),
    ]);

    let mut engine = GameEngine::new(store.clone());
    assert!(engine.bot_turn_ready());

    let ticket = engine.schedule_bot().expect("bot turn ready");
    let moved = engine.resolve_bot(ticket).expect("memory store cannot fail");
    assert!(moved.was_applied());

    // The hard policy has no threat to answer and falls back to cell 1.
    assert_eq!(engine.board().cell(1), Some(Mark::O));
    assert_eq!(
        store.raw(KEY_SQUARES).as_deref(),
        Some(r#"["X","O",null,null,null,null,null,null,null]"#)
    );
    assert_eq!(store.raw(KEY_X_IS_NEXT).as_deref(), Some("true"));
}

#[test]
fn full_board_without_winner_restores_as_a_draw_without_rescoring() {
    let store = seeded_store(&[
        (KEY_SQUARES, r#"["X","O","X","O","X","X","O","X","O"]"#),
        (KEY_X_IS_NEXT, "false"),
        (KEY_SCORES, r#"{"X":0,"O":0,"Draws":1}"#),
    ]);

    let mut engine = GameEngine::new(store);
    assert_eq!(engine.outcome(), Outcome::Draw);
    assert_eq!(engine.scores().draws, 1);

    let rejected = engine.human_move(0).expect("memory store cannot fail");
    assert_eq!(rejected.rejection(), Some(MoveRejection::GameOver));
    assert!(engine.schedule_bot().is_none());
}

#[test]
fn winning_board_restores_terminal_without_rescoring() {
    let store = seeded_store(&[
        (KEY_SQUARES, r#"["X","X","X","O","O",null,null,null,null]"#),
        (KEY_X_IS_NEXT, "false"),
        (KEY_SCORES, r#"{"X":1,"O":0,"Draws":0}"#),
    ]);

    let engine = GameEngine::new(store);
    assert_eq!(engine.outcome(), Outcome::Won(Mark::X));
    assert_eq!(engine.scores().x, 1);
    assert!(!engine.bot_turn_ready());
}

#[test]
fn damaged_keys_fall_back_independently() {
    let store = seeded_store(&[
        (KEY_SQUARES, r#"["X",null,null,null,"O",null,null,null,null]"#),
        (KEY_X_IS_NEXT, "\"sim\""),
        (KEY_SCORES, r#"{"X":"dois"}"#),
        (KEY_DIFFICULTY, "\"medium\""),
    ]);

    let engine = GameEngine::new(store);
    // The readable board survives while every damaged key defaults.
    assert_eq!(engine.board().filled_count(), 2);
    assert!(engine.x_is_next());
    assert_eq!(engine.scores().games_played(), 0);
    assert_eq!(engine.difficulty(), Difficulty::Easy);
}

#[test]
fn wrong_length_board_values_are_ignored() {
    let eight = seeded_store(&[(
        KEY_SQUARES,
        r#"["X",null,null,null,null,null,null,null]"#,
    )]);
    assert!(GameEngine::new(eight).board().is_empty());

    let ten = seeded_store(&[(
        KEY_SQUARES,
        r#"[null,null,null,null,null,null,null,null,null,"O"]"#,
    )]);
    assert!(GameEngine::new(ten).board().is_empty());
}

#[test]
fn unquoted_name_value_falls_back_to_the_default() {
    let store = seeded_store(&[(KEY_PLAYER_ONE_NAME, "Maria")]);
    let engine = GameEngine::new(store);
    assert_eq!(engine.names().player_one, "X");
    assert_eq!(engine.names().player_two, "O");
}

#[test]
fn names_and_difficulty_survive_a_restart() {
    let store = MemoryStore::new();
    let mut engine = GameEngine::new(store.clone());
    engine.set_names("  João  ", "Pedro Almeida Cru").unwrap();
    engine.set_difficulty(Difficulty::Hard).unwrap();
    drop(engine);

    let revived = GameEngine::new(store);
    assert_eq!(revived.names().player_one, "João");
    assert_eq!(revived.names().player_two, "Pedro Almeid");
    assert_eq!(revived.difficulty(), Difficulty::Hard);
}

#[test]
fn scores_survive_reset_and_restart() {
    let store = MemoryStore::new();
    let mut engine = GameEngine::new(store.clone());
    engine.set_difficulty(Difficulty::Hard).unwrap();

    // First-empty human against the hard policy fills the board for a draw.
    while !engine.outcome().is_terminal() {
        if engine.x_is_next() {
            let cell = engine.board().first_empty().expect("live game has space");
            assert!(engine.human_move(cell).unwrap().was_applied());
        } else {
            let ticket = engine.schedule_bot().expect("bot turn ready");
            assert!(engine.resolve_bot(ticket).unwrap().was_applied());
        }
    }
    assert_eq!(engine.scores().draws, 1);
    engine.reset().unwrap();
    drop(engine);

    assert_eq!(store.raw(KEY_SQUARES), None);
    let revived = GameEngine::new(store);
    assert!(revived.board().is_empty());
    assert!(revived.x_is_next());
    assert_eq!(revived.scores().draws, 1);
}

#[test]
fn reset_scores_clears_the_tally_for_the_next_restore() {
    let store = seeded_store(&[(KEY_SCORES, r#"{"X":5,"O":4,"Draws":2}"#)]);
    let mut engine = GameEngine::new(store.clone());
    assert_eq!(engine.scores().games_played(), 11);

    engine.reset_scores().unwrap();
    drop(engine);

    let revived = GameEngine::new(store);
    assert_eq!(revived.scores().games_played(), 0);
}
