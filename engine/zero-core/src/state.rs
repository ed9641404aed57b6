//! The game-state contract consumed by the search engine.
//!
//! The driver owns the authoritative position; the engine only ever searches
//! on clones of it. Anything a game needs beyond these members (board
//! geometry, rule helpers, model plumbing) is its own business.

use std::fmt;

use thiserror::Error;

use crate::model::ModelError;

/// Errors for state queries that are only valid on finished games.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("result requested before the game finished")]
    NotFinished,
}

/// Priors and value produced by one evaluation of a position.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Prior probability per requested action, aligned one-to-one with the
    /// action slice passed to [`GameState::evaluate`].
    pub priors: Vec<f32>,
    /// Scalar value estimate for the position, in `[-1, 1]`.
    pub value: f32,
}

/// A mutable two-player, zero-sum, perfect-information position.
///
/// Implementations must be cheap to clone: the engine clones the root
/// position once per search iteration and mutates only the clone.
pub trait GameState: Clone {
    /// Domain move type. `Display` is the stable textual form used in
    /// diagnostics and logs.
    type Action: Clone + PartialEq + fmt::Debug + fmt::Display;

    /// Training-input representation; opaque to the engine.
    type StateEncoding;

    /// Training-target representation; opaque to the engine.
    type PolicyEncoding;

    /// Dirichlet concentration per legal action for root noise. Positive.
    const ALPHA: f64;

    /// Exploration weight `C` in the UCB score. Non-negative.
    const UCT_C: f64;

    /// Number of plies played so far.
    fn turn(&self) -> u32;

    /// Index of the player to move.
    fn current_player(&self) -> usize;

    /// True once the game is decided and no further action can be taken.
    fn is_finished(&self) -> bool;

    /// Ordered legal actions; empty exactly when the game is finished.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Applies an action in place. Behavior on illegal actions is undefined.
    fn apply_action(&mut self, action: &Self::Action);

    /// Evaluates the position, returning priors aligned with `actions` and a
    /// scalar value. With an empty action slice only the value is meaningful
    /// (used for terminal positions reached during search).
    fn evaluate(&self, actions: &[Self::Action]) -> Result<Evaluation, ModelError>;

    /// Encodes the position as a training input, from the perspective of the
    /// player to move.
    fn encode_for_training(&self) -> Self::StateEncoding;

    /// Lays the search distribution `pi` (aligned with `actions`) over the
    /// game's full policy target, zero everywhere else.
    fn encode_policy_for_training(
        &self,
        actions: &[Self::Action],
        pi: &[f64],
    ) -> Self::PolicyEncoding;

    /// Per-player outcome vector. Fails on unfinished games rather than
    /// returning a placeholder.
    fn result(&self) -> Result<Vec<i8>, StateError>;
}
