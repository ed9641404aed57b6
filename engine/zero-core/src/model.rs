//! Position evaluation capability.
//!
//! A model maps an encoded position to raw policy scores over the game's
//! action grid plus a scalar value. Implementations could be:
//! - an in-process float network
//! - a quantized or accelerator-compiled backend
//! - the fixed backends below, for running the search without a trained model
//!
//! Games receive model handles at construction and keep sharing them across
//! clones; backends must therefore be safe to call from several positions.

use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model returned {got} policy values, expected {expected}")]
    PolicyShape { expected: usize, got: usize },
}

/// Raw output of one forward pass.
#[derive(Debug, Clone)]
pub struct PredictOutput {
    /// Unnormalized policy scores over the game's full action grid.
    pub policy: Vec<f32>,
    /// Scalar value estimate in `[-1, 1]`.
    pub value: f32,
}

/// Maps an encoded position to `(policy, value)`.
pub trait PolicyValueModel: Send + Sync {
    fn predict(&self, input: &[f32]) -> Result<PredictOutput, ModelError>;
}

/// Flat policy scores and a fixed value.
///
/// After the game-side softmax a flat score vector becomes a uniform prior
/// over the requested actions.
#[derive(Debug, Clone)]
pub struct UniformModel {
    policy_len: usize,
    value: f32,
}

impl UniformModel {
    pub fn new(policy_len: usize) -> Self {
        Self {
            policy_len,
            value: 0.0,
        }
    }

    pub fn with_value(policy_len: usize, value: f32) -> Self {
        Self { policy_len, value }
    }
}

impl PolicyValueModel for UniformModel {
    fn predict(&self, _input: &[f32]) -> Result<PredictOutput, ModelError> {
        Ok(PredictOutput {
            policy: vec![0.0; self.policy_len],
            value: self.value,
        })
    }
}

/// Returns caller-chosen scores verbatim; for rigging evaluations in tests.
#[derive(Debug, Clone)]
pub struct ConstantModel {
    pub policy: Vec<f32>,
    pub value: f32,
}

impl ConstantModel {
    pub fn new(policy: Vec<f32>, value: f32) -> Self {
        Self { policy, value }
    }
}

impl PolicyValueModel for ConstantModel {
    fn predict(&self, _input: &[f32]) -> Result<PredictOutput, ModelError> {
        Ok(PredictOutput {
            policy: self.policy.clone(),
            value: self.value,
        })
    }
}
