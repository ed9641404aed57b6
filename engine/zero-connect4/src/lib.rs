//! Connect 4 implementation of the zero-core game contract
//!
//! Two players drop discs into a 7-column, 6-row grid; the first to line up
//! four horizontally, vertically or diagonally wins. A full board with no
//! winner is a draw.
//!
//! # Board Layout
//!
//! The board is stored in row-major order, with row 0 at the bottom:
//! ```text
//! Row 5: [35][36][37][38][39][40][41]  <- Top
//! Row 4: [28][29][30][31][32][33][34]
//! Row 3: [21][22][23][24][25][26][27]
//! Row 2: [14][15][16][17][18][19][20]
//! Row 1: [ 7][ 8][ 9][10][11][12][13]
//! Row 0: [ 0][ 1][ 2][ 3][ 4][ 5][ 6]  <- Bottom
//!         Col 0  1  2  3  4  5  6
//! ```
//!
//! Each position holds one evaluation model handle per player; clones share
//! the handles, so scratch copies made during search never duplicate a
//! backend.

use std::fmt;
use std::sync::Arc;

use zero_core::{Evaluation, GameState, ModelError, PolicyValueModel, StateError};

/// Board dimensions
pub const COLS: usize = 7;
pub const ROWS: usize = 6;
pub const BOARD_SIZE: usize = COLS * ROWS; // 42

/// Previous board positions encoded alongside the current one.
pub const HISTORY_BOARDS: usize = 2;
/// Channels of the training-state encoding: one plane per player per
/// encoded board, plus a color plane.
pub const STATE_CHANNELS: usize = 2 * (HISTORY_BOARDS + 1) + 1;
/// Length of the flattened training-state encoding.
pub const STATE_LEN: usize = BOARD_SIZE * STATE_CHANNELS;

/// Drop a disc into `col`; gravity brings it to rest at `row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropAction {
    pub col: u8,
    pub row: u8,
}

impl fmt::Display for DropAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}Y{}", self.col + 1, self.row + 1)
    }
}

/// Connect 4 position with injected evaluation models, one per player.
#[derive(Clone)]
pub struct Connect4 {
    /// 0 = empty, 1 = first player, 2 = second player
    board: [u8; BOARD_SIZE],
    /// Boards as they stood before each previous ply, oldest first.
    history: Vec<[u8; BOARD_SIZE]>,
    /// Win flag per player; both set means the game is drawn.
    finished: [bool; 2],
    turn: u32,
    models: [Arc<dyn PolicyValueModel>; 2],
}

impl Connect4 {
    /// Creates an empty position; `first` moves on even plies, `second` on
    /// odd plies.
    pub fn new(first: Arc<dyn PolicyValueModel>, second: Arc<dyn PolicyValueModel>) -> Self {
        Self {
            board: [0; BOARD_SIZE],
            history: Vec::new(),
            finished: [false, false],
            turn: 0,
            models: [first, second],
        }
    }

    /// Creates an empty position with both players on the same model.
    pub fn with_shared_model(model: Arc<dyn PolicyValueModel>) -> Self {
        Self::new(Arc::clone(&model), model)
    }

    /// Winning player index, if any.
    pub fn winner(&self) -> Option<usize> {
        match self.finished {
            [true, false] => Some(0),
            [false, true] => Some(1),
            _ => None,
        }
    }

    /// Convert column and row to board index
    #[inline]
    fn pos(col: usize, row: usize) -> usize {
        row * COLS + col
    }

    /// Row where a disc dropped into `col` comes to rest, or `None` when
    /// the column is full.
    fn drop_row(&self, col: usize) -> Option<usize> {
        (0..ROWS).find(|&row| self.board[Self::pos(col, row)] == 0)
    }

    /// Check if the disc at (col, row) completes a line of four.
    fn wins_at(&self, col: usize, row: usize) -> bool {
        let player = self.board[Self::pos(col, row)];

        // Direction vectors: horizontal, vertical, diagonal /, diagonal \
        let directions: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

        for (dc, dr) in directions {
            let mut count = 1; // the disc just placed

            for sign in [1i32, -1] {
                let (mut c, mut r) = (col as i32 + sign * dc, row as i32 + sign * dr);
                while c >= 0
                    && c < COLS as i32
                    && r >= 0
                    && r < ROWS as i32
                    && self.board[Self::pos(c as usize, r as usize)] == player
                {
                    count += 1;
                    c += sign * dc;
                    r += sign * dr;
                }
            }

            if count >= 4 {
                return true;
            }
        }
        false
    }

    /// Flattened `(row, col, channel)` training planes from the current
    /// player's perspective: own discs for the current and each history
    /// board, then the opponent's, then a constant color plane.
    fn encode_state(&self) -> Vec<f32> {
        let me = self.current_player() as u8 + 1;
        let opponent = 3 - me;

        let mut boards: Vec<&[u8; BOARD_SIZE]> = vec![&self.board];
        boards.extend(self.history.iter().rev().take(HISTORY_BOARDS));

        let mut planes = vec![0.0f32; STATE_LEN];
        for (t, board) in boards.iter().enumerate() {
            for (cell, &fig) in board.iter().enumerate() {
                let base = cell * STATE_CHANNELS;
                if fig == me {
                    planes[base + t] = 1.0;
                } else if fig == opponent {
                    planes[base + HISTORY_BOARDS + 1 + t] = 1.0;
                }
            }
        }

        let color = self.current_player() as f32;
        for cell in 0..BOARD_SIZE {
            planes[cell * STATE_CHANNELS + STATE_CHANNELS - 1] = color;
        }
        planes
    }
}

impl GameState for Connect4 {
    type Action = DropAction;
    type StateEncoding = Vec<f32>;
    type PolicyEncoding = Vec<f32>;

    // Around seven actions are available on average.
    const ALPHA: f64 = 1.0 / 7.0;
    const UCT_C: f64 = 1.0;

    fn turn(&self) -> u32 {
        self.turn
    }

    fn current_player(&self) -> usize {
        (self.turn % 2) as usize
    }

    fn is_finished(&self) -> bool {
        self.finished[0] || self.finished[1]
    }

    fn legal_actions(&self) -> Vec<DropAction> {
        if self.is_finished() {
            return Vec::new();
        }

        (0..COLS)
            .filter_map(|col| {
                self.drop_row(col).map(|row| DropAction {
                    col: col as u8,
                    row: row as u8,
                })
            })
            .collect()
    }

    fn apply_action(&mut self, action: &DropAction) {
        let mover = self.current_player();
        self.history.push(self.board);
        self.board[Self::pos(action.col as usize, action.row as usize)] = mover as u8 + 1;

        if self.wins_at(action.col as usize, action.row as usize) {
            self.finished[mover] = true;
        } else if self.board.iter().all(|&cell| cell != 0) {
            self.finished = [true, true]; // drawn
        }
        self.turn += 1;
    }

    fn evaluate(&self, actions: &[DropAction]) -> Result<Evaluation, ModelError> {
        let out = self.models[self.current_player()].predict(&self.encode_state())?;
        if out.policy.len() != BOARD_SIZE {
            return Err(ModelError::PolicyShape {
                expected: BOARD_SIZE,
                got: out.policy.len(),
            });
        }

        // Softmax over the scores of the requested cells only.
        let scores: Vec<f32> = actions
            .iter()
            .map(|a| out.policy[Self::pos(a.col as usize, a.row as usize)].exp())
            .collect();
        let total: f32 = scores.iter().sum::<f32>() + f32::EPSILON;
        let priors = scores.iter().map(|s| s / total).collect();

        Ok(Evaluation {
            priors,
            value: out.value,
        })
    }

    fn encode_for_training(&self) -> Vec<f32> {
        self.encode_state()
    }

    fn encode_policy_for_training(&self, actions: &[DropAction], pi: &[f64]) -> Vec<f32> {
        let mut policy = vec![0.0f32; BOARD_SIZE];
        for (action, &p) in actions.iter().zip(pi) {
            policy[Self::pos(action.col as usize, action.row as usize)] = p as f32;
        }
        policy
    }

    fn result(&self) -> Result<Vec<i8>, StateError> {
        match self.finished {
            [true, true] => Ok(vec![0, 0]),
            [true, false] => Ok(vec![1, -1]),
            [false, true] => Ok(vec![-1, 1]),
            [false, false] => Err(StateError::NotFinished),
        }
    }
}

impl fmt::Display for Connect4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            for col in 0..COLS {
                let fig = match self.board[Self::pos(col, row)] {
                    1 => 'O',
                    2 => 'X',
                    _ => ' ',
                };
                write!(f, "|{fig}")?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Connect4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connect4")
            .field("turn", &self.turn)
            .field("finished", &self.finished)
            .field("board", &self.board)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
