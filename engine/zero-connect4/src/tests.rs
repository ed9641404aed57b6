use std::sync::Arc;

use zero_core::{ConstantModel, UniformModel};

use super::*;

fn uniform() -> Connect4 {
    Connect4::with_shared_model(Arc::new(UniformModel::new(BOARD_SIZE)))
}

/// Drops into `col` through the legal-action list and returns the action.
fn drop_in(game: &mut Connect4, col: u8) -> DropAction {
    let action = game
        .legal_actions()
        .into_iter()
        .find(|a| a.col == col)
        .unwrap();
    game.apply_action(&action);
    action
}

#[test]
fn test_initial_state() {
    let game = uniform();

    assert_eq!(game.turn(), 0);
    assert_eq!(game.current_player(), 0);
    assert!(!game.is_finished());
    assert!(game.winner().is_none());

    let actions = game.legal_actions();
    assert_eq!(actions.len(), COLS);
    for (col, action) in actions.iter().enumerate() {
        assert_eq!(action.col, col as u8);
        assert_eq!(action.row, 0);
    }
}

#[test]
fn test_gravity_stacking() {
    let mut game = uniform();

    for expected_row in 0..ROWS {
        let action = drop_in(&mut game, 0);
        assert_eq!(action.row, expected_row as u8);
    }

    // Column 0 is now full
    assert!(game.legal_actions().iter().all(|a| a.col != 0));
    assert_eq!(game.legal_actions().len(), COLS - 1);
}

#[test]
fn test_players_alternate_by_turn() {
    let mut game = uniform();

    assert_eq!(game.current_player(), 0);
    drop_in(&mut game, 3);
    assert_eq!(game.current_player(), 1);
    drop_in(&mut game, 3);
    assert_eq!(game.current_player(), 0);
    assert_eq!(game.turn(), 2);
}

#[test]
fn test_horizontal_win() {
    let mut game = uniform();

    // First player fills the bottom row left to right, second stacks on top.
    for col in 0..3 {
        drop_in(&mut game, col); // first player at (col, 0)
        drop_in(&mut game, col); // second player at (col, 1)
    }
    drop_in(&mut game, 3); // first player completes (0..=3, 0)

    assert!(game.is_finished());
    assert_eq!(game.winner(), Some(0));
    assert_eq!(game.result().unwrap(), vec![1, -1]);
    assert!(game.legal_actions().is_empty());
}

#[test]
fn test_vertical_win() {
    let mut game = uniform();

    for _ in 0..3 {
        drop_in(&mut game, 0); // first player stacks column 0
        drop_in(&mut game, 1); // second player stacks column 1
    }
    drop_in(&mut game, 0); // fourth disc in column 0

    assert_eq!(game.winner(), Some(0));
    assert_eq!(game.result().unwrap(), vec![1, -1]);
}

#[test]
fn test_second_player_win() {
    let mut game = uniform();

    // First player wanders, second player stacks column 6.
    for col in [0u8, 6, 1, 6, 2, 6, 4] {
        drop_in(&mut game, col);
    }
    drop_in(&mut game, 6); // fourth disc in column 6

    assert_eq!(game.winner(), Some(1));
    assert_eq!(game.result().unwrap(), vec![-1, 1]);
}

#[test]
fn test_ascending_diagonal_win() {
    let mut game = uniform();

    // First player builds (0,0), (1,1), (2,2), (3,3).
    for col in [0u8, 1, 1, 2, 5, 2, 2, 3, 3, 3] {
        drop_in(&mut game, col);
    }
    assert!(!game.is_finished());
    drop_in(&mut game, 3); // lands at (3, 3)

    assert_eq!(game.winner(), Some(0));
}

#[test]
fn test_descending_diagonal_win() {
    let mut game = uniform();

    // First player builds (3,0), (2,1), (1,2), (0,3).
    for col in [3u8, 2, 2, 1, 5, 1, 1, 0, 0, 0] {
        drop_in(&mut game, col);
    }
    assert!(!game.is_finished());
    drop_in(&mut game, 0); // lands at (0, 3)

    assert_eq!(game.winner(), Some(0));
}

#[test]
fn test_draw_on_full_board() {
    // Paired rows of alternating colors never line up four in any
    // direction.
    let pattern: [[u8; COLS]; ROWS] = [
        [1, 2, 1, 2, 1, 2, 1],
        [1, 2, 1, 2, 1, 2, 1],
        [2, 1, 2, 1, 2, 1, 2],
        [2, 1, 2, 1, 2, 1, 2],
        [1, 2, 1, 2, 1, 2, 1],
        [1, 2, 1, 2, 1, 2, 1],
    ];

    let mut game = uniform();
    for (row, cols) in pattern.iter().enumerate() {
        for (col, &fig) in cols.iter().enumerate() {
            game.board[row * COLS + col] = fig;
        }
    }
    // Reopen the top-right cell (pattern value 1) and let the first player
    // close out the board.
    game.board[5 * COLS + 6] = 0;
    game.turn = 40;

    game.apply_action(&DropAction { col: 6, row: 5 });

    assert!(game.is_finished());
    assert!(game.winner().is_none());
    assert_eq!(game.result().unwrap(), vec![0, 0]);
}

#[test]
fn test_result_fails_before_finish() {
    let mut game = uniform();
    assert!(matches!(game.result(), Err(StateError::NotFinished)));

    drop_in(&mut game, 3);
    assert!(matches!(game.result(), Err(StateError::NotFinished)));
}

#[test]
fn test_clone_is_independent() {
    let game = uniform();
    let mut copy = game.clone();

    drop_in(&mut copy, 3);

    assert_eq!(game.turn(), 0);
    assert_eq!(copy.turn(), 1);
    assert!(game.board.iter().all(|&cell| cell == 0));
}

#[test]
fn test_clone_shares_model_handles() {
    let game = uniform();
    let copy = game.clone();

    assert!(Arc::ptr_eq(&game.models[0], &copy.models[0]));
    assert!(Arc::ptr_eq(&game.models[1], &copy.models[1]));
}

#[test]
fn test_state_encoding_planes() {
    let mut game = uniform();
    drop_in(&mut game, 3); // first player at (3, 0)

    let planes = game.encode_for_training();
    assert_eq!(planes.len(), STATE_LEN);

    // From the second player's perspective the disc at cell 3 is the
    // opponent's, current board (t = 0).
    let cell = 3;
    assert_eq!(planes[cell * STATE_CHANNELS + HISTORY_BOARDS + 1], 1.0);
    assert_eq!(planes[cell * STATE_CHANNELS], 0.0);

    // Color plane holds the player index.
    assert!((0..BOARD_SIZE)
        .all(|c| planes[c * STATE_CHANNELS + STATE_CHANNELS - 1] == 1.0));
}

#[test]
fn test_state_encoding_history() {
    let mut game = uniform();
    drop_in(&mut game, 3); // first player at (3, 0)
    drop_in(&mut game, 3); // second player at (3, 1)

    // Back to the first player: own disc on the current board and on the
    // one-ply-old board, opponent disc on the current board only.
    let planes = game.encode_for_training();
    let own_cell = 3; // (3, 0)
    let opp_cell = COLS + 3; // (3, 1)

    assert_eq!(planes[own_cell * STATE_CHANNELS], 1.0); // t = 0
    assert_eq!(planes[own_cell * STATE_CHANNELS + 1], 1.0); // t = 1
    assert_eq!(planes[opp_cell * STATE_CHANNELS + HISTORY_BOARDS + 1], 1.0);
    assert_eq!(planes[opp_cell * STATE_CHANNELS + HISTORY_BOARDS + 2], 0.0);

    // Color plane back to zero.
    assert_eq!(planes[STATE_CHANNELS - 1], 0.0);
}

#[test]
fn test_policy_encoding_lays_pi_over_cells() {
    let game = uniform();
    let actions = [
        DropAction { col: 0, row: 0 },
        DropAction { col: 3, row: 0 },
    ];

    let policy = game.encode_policy_for_training(&actions, &[0.25, 0.75]);

    assert_eq!(policy.len(), BOARD_SIZE);
    assert_eq!(policy[0], 0.25);
    assert_eq!(policy[3], 0.75);
    assert!((policy.iter().sum::<f32>() - 1.0).abs() < 1e-6);
}

#[test]
fn test_evaluate_softmax_over_requested_cells() {
    let mut scores = vec![0.0f32; BOARD_SIZE];
    scores[3] = 2.0; // cell (3, 0)
    let game = Connect4::with_shared_model(Arc::new(ConstantModel::new(scores, 0.125)));

    let actions = game.legal_actions();
    let eval = game.evaluate(&actions).unwrap();

    assert_eq!(eval.priors.len(), COLS);
    assert!((eval.priors.iter().sum::<f32>() - 1.0).abs() < 1e-3);
    assert_eq!(eval.value, 0.125);

    // The boosted center cell takes the largest prior.
    let center = eval.priors[3];
    for (col, &p) in eval.priors.iter().enumerate() {
        if col != 3 {
            assert!(center > p);
        }
    }
}

#[test]
fn test_evaluate_terminal_value_only() {
    let game = Connect4::with_shared_model(Arc::new(UniformModel::with_value(BOARD_SIZE, -0.5)));

    let eval = game.evaluate(&[]).unwrap();
    assert!(eval.priors.is_empty());
    assert_eq!(eval.value, -0.5);
}

#[test]
fn test_evaluate_rejects_misshapen_policy() {
    let game = Connect4::with_shared_model(Arc::new(ConstantModel::new(vec![0.0; 10], 0.0)));

    let result = game.evaluate(&game.legal_actions());
    assert!(matches!(
        result,
        Err(ModelError::PolicyShape {
            expected: BOARD_SIZE,
            got: 10
        })
    ));
}

#[test]
fn test_action_display() {
    let action = DropAction { col: 2, row: 4 };
    assert_eq!(action.to_string(), "X3Y5");
}

#[test]
fn test_board_display() {
    let mut game = uniform();
    drop_in(&mut game, 0);

    let rendered = game.to_string();
    assert_eq!(rendered.lines().last().unwrap(), "|O| | | | | | |");
}
