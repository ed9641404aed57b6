//! Monte-Carlo Tree Search over the `zero-core` game contract.
//!
//! # Overview
//!
//! One [`Mcts`] engine follows one player through one game. Each
//! [`Mcts::execute`] call runs a number of strictly sequential iterations:
//!
//! 1. **Selection**: walk from the sub-root by UCB score on a scratch clone
//!    of the real position; Dirichlet noise perturbs only the sub-root's own
//!    child choice
//! 2. **Expansion**: a leaf is expanded with a single evaluation that
//!    provides every child's prior and the value to back up; a terminal
//!    scratch position is evaluated for its value only
//! 3. **Backpropagation**: visit counts and accumulated values are updated
//!    along the visited path
//!
//! and then converts the sub-root's visit counts into a move, either
//! deterministically (most visits) or stochastically with a turn-dependent
//! temperature plus training encodings. Between real plies,
//! [`Mcts::update`] re-roots the tree into the played child — statistics
//! carry forward instead of being recomputed, and abandoned siblings become
//! unreachable.
//!
//! # Usage
//!
//! The driver owns the authoritative game and one engine per player:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use zero_connect4::Connect4;
//! use zero_core::{GameState, UniformModel};
//! use zero_mcts::{Mcts, MctsConfig, SelectionMode};
//!
//! let model = Arc::new(UniformModel::new(42));
//! let mut game = Connect4::with_shared_model(model);
//! let mut engines = [
//!     Mcts::new(MctsConfig::default(), ChaCha20Rng::seed_from_u64(1)),
//!     Mcts::new(MctsConfig::default(), ChaCha20Rng::seed_from_u64(2)),
//! ];
//!
//! while !game.is_finished() {
//!     let mover = game.current_player();
//!     let decision = engines[mover].execute(800, &game, SelectionMode::Stochastic)?;
//!
//!     // Every tree advances, the mover's included.
//!     for engine in &mut engines {
//!         engine.update(&decision.action);
//!     }
//!     game.apply_action(&decision.action);
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! +---------------------------------------------------------+
//! |                         Mcts                            |
//! +---------------------------------------------------------+
//! |  +-------------+  +--------------+  +----------------+  |
//! |  | SearchTree  |  |  GameState   |  |  ChaCha20Rng   |  |
//! |  |  (arena)    |  | (scratch     |  | (noise +       |  |
//! |  |             |  |   clones)    |  |   sampling)    |  |
//! |  +-------------+  +--------------+  +----------------+  |
//! |                                                         |
//! |     select -> expand/evaluate -> backpropagate          |
//! +---------------------------------------------------------+
//! ```
//!
//! The engine is single-threaded; run one engine per concurrently simulated
//! game and give each its own seeded generator.

pub mod config;
pub mod node;
pub mod search;
pub mod tree;

// Re-export main types
pub use config::{MctsConfig, SignConvention};
pub use node::{Node, NodeId};
pub use search::{Decision, Mcts, SearchError, SelectionMode, TrainingSample};
pub use tree::{SearchTree, TreeStats};
