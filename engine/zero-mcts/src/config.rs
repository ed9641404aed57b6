//! Search configuration.

use serde::{Deserialize, Serialize};

/// How evaluated values are written back along the visited path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignConvention {
    /// Add the leaf evaluation unchanged to every node on the path,
    /// regardless of which player owns each decision point.
    ///
    /// Note that conventional two-player zero-sum search negates the value
    /// at alternating depths instead; the two conventions disagree on
    /// adversarial positions, so pick deliberately.
    #[default]
    Uniform,

    /// Negate the value at each ply walking back from the leaf, so every
    /// node accumulates values from its own mover's perspective.
    Alternating,
}

/// Configuration for one search engine instance.
///
/// Game-specific search constants (Dirichlet concentration, exploration
/// weight) live on the game itself; this covers the knobs that are
/// game-independent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MctsConfig {
    /// Fraction of each sub-root prior replaced by Dirichlet noise.
    /// 0.25 means 75% prior + 25% noise; 0.0 disables the blend.
    pub dirichlet_epsilon: f64,

    /// Stochastic-selection temperature while `turn < tau_switch_ply`.
    /// 1.0 samples proportionally to visit counts.
    pub tau_early: f64,

    /// Temperature from `tau_switch_ply` on. Small values concentrate the
    /// move distribution sharply on the most-visited child.
    pub tau_late: f64,

    /// Ply at which stochastic selection switches from `tau_early` to
    /// `tau_late`.
    pub tau_switch_ply: u32,

    /// Backpropagation sign convention.
    pub sign_convention: SignConvention,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            dirichlet_epsilon: 0.25,
            tau_early: 1.0,
            tau_late: 0.05,
            tau_switch_ply: 60,
            sign_convention: SignConvention::Uniform,
        }
    }
}

impl MctsConfig {
    /// Temperature for a stochastic move decision at the given ply.
    pub fn temperature(&self, turn: u32) -> f64 {
        if turn < self.tau_switch_ply {
            self.tau_early
        } else {
            self.tau_late
        }
    }

    /// Builder pattern: set the noise share of sub-root priors.
    pub fn with_dirichlet_epsilon(mut self, epsilon: f64) -> Self {
        self.dirichlet_epsilon = epsilon;
        self
    }

    /// Builder pattern: set the backpropagation sign convention.
    pub fn with_sign_convention(mut self, convention: SignConvention) -> Self {
        self.sign_convention = convention;
        self
    }

    /// Builder pattern: set the temperature switch ply.
    pub fn with_tau_switch_ply(mut self, ply: u32) -> Self {
        self.tau_switch_ply = ply;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();

        assert!((config.dirichlet_epsilon - 0.25).abs() < 1e-9);
        assert_eq!(config.tau_switch_ply, 60);
        assert_eq!(config.sign_convention, SignConvention::Uniform);
    }

    #[test]
    fn test_temperature_switch() {
        let config = MctsConfig::default();

        assert!((config.temperature(0) - 1.0).abs() < 1e-9);
        assert!((config.temperature(59) - 1.0).abs() < 1e-9);
        assert!((config.temperature(60) - 0.05).abs() < 1e-9);
        assert!((config.temperature(200) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_builder_pattern() {
        let config = MctsConfig::default()
            .with_dirichlet_epsilon(0.0)
            .with_sign_convention(SignConvention::Alternating)
            .with_tau_switch_ply(15);

        assert_eq!(config.dirichlet_epsilon, 0.0);
        assert_eq!(config.sign_convention, SignConvention::Alternating);
        assert_eq!(config.tau_switch_ply, 15);
    }
}
