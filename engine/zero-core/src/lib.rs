//! Core contracts for the zero engine
//!
//! This crate defines the two seams every other crate builds against:
//! - [`GameState`]: a mutable, clonable game position with legality,
//!   transition, termination and evaluation-request semantics. The search
//!   engine in `zero-mcts` drives implementations of this trait and nothing
//!   else.
//! - [`PolicyValueModel`]: the evaluation capability — encoded position in,
//!   policy scores and a scalar value out. Games hold injected model handles
//!   and translate between their action space and the model's output grid.
//!
//! Game implementations live in their own crates (see `zero-connect4`).

pub mod model;
pub mod state;

// Re-export main types for convenience
pub use model::{ConstantModel, ModelError, PolicyValueModel, PredictOutput, UniformModel};
pub use state::{Evaluation, GameState, StateError};
