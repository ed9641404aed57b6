//! The search engine.
//!
//! One engine instance follows one player through one game. `execute` runs a
//! number of strictly sequential iterations from the current sub-root — each
//! iteration selects by UCB on a scratch clone of the real position, expands
//! the reached leaf with a single evaluation, and backpropagates — then
//! converts the sub-root's child visit counts into a move. `update` advances
//! the sub-root after every real ply (the mover's and the opponent's alike),
//! carrying statistics forward instead of rebuilding the tree.

use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Gamma};
use thiserror::Error;
use tracing::{debug, error, trace};

use zero_core::{GameState, ModelError};

use crate::config::{MctsConfig, SignConvention};
use crate::node::NodeId;
use crate::tree::{SearchTree, TreeStats};

/// Errors that can occur during a search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("evaluation failed: {0}")]
    Model(#[from] ModelError),

    /// Stochastic selection found no visited child to sample from.
    #[error("no sub-root child has been visited; cannot sample a move")]
    DegeneratePolicy,
}

/// Move selection mode for [`Mcts::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Most-visited child; ties go to the lowest index.
    Deterministic,
    /// Sample from the temperature distribution over visit counts and
    /// capture training encodings alongside the action.
    Stochastic,
}

/// Training data captured by a stochastic decision.
pub struct TrainingSample<G: GameState> {
    /// Pre-search position encoding.
    pub state: G::StateEncoding,
    /// Search distribution laid over the game's policy target.
    pub policy: G::PolicyEncoding,
}

/// Outcome of one [`Mcts::execute`] call.
pub struct Decision<G: GameState> {
    /// Action to apply to the real game.
    pub action: G::Action,
    /// Present for stochastic decisions only.
    pub sample: Option<TrainingSample<G>>,
}

/// Monte-Carlo tree search over one game, for one player.
///
/// The permanent root is never discarded; `sub_root` tracks the node that
/// corresponds to the current real position and only ever advances toward
/// the leaves via [`Mcts::update`].
pub struct Mcts<G: GameState> {
    tree: SearchTree<G::Action>,
    sub_root: NodeId,
    config: MctsConfig,
    rng: ChaCha20Rng,
}

impl<G: GameState> Mcts<G> {
    /// Creates an engine with an empty artificial root and an owned,
    /// caller-seeded generator.
    pub fn new(config: MctsConfig, rng: ChaCha20Rng) -> Self {
        let tree = SearchTree::new();
        let sub_root = tree.root();
        Self {
            tree,
            sub_root,
            config,
            rng,
        }
    }

    /// Runs `iterations` search iterations from the current sub-root, then
    /// picks a move over its children.
    ///
    /// `root_state` must be the real, non-terminal position the sub-root
    /// stands for; the engine mutates only clones of it. The tree is left in
    /// place, so `execute` may be called again for the same position.
    ///
    /// # Panics
    ///
    /// Panics if `iterations` is zero.
    pub fn execute(
        &mut self,
        iterations: u32,
        root_state: &G,
        mode: SelectionMode,
    ) -> Result<Decision<G>, SearchError> {
        assert!(iterations > 0, "execute requires at least one iteration");

        // One noise draw per call, sized to the sub-root's child count
        // before any expansion this call performs. A fresh sub-root
        // therefore searches its first call without noise.
        let noise = dirichlet_noise(
            self.tree.get(self.sub_root).children.len(),
            G::ALPHA,
            &mut self.rng,
        );

        for _ in 0..iterations {
            let mut scratch = root_state.clone();
            let (path, value) = self.select_and_expand(&mut scratch, &noise)?;
            self.backpropagate(&path, value);
            trace!(path_len = path.len(), value, "iteration complete");
        }

        match mode {
            SelectionMode::Deterministic => self.decide_deterministic(),
            SelectionMode::Stochastic => self.decide_stochastic(root_state),
        }
    }

    /// Advances the sub-root through `action` after a real ply.
    ///
    /// An unexpanded sub-root gets a synthesized, unvisited child with prior
    /// 1.0 (the position was never searched before the ply happened).
    ///
    /// # Panics
    ///
    /// Panics if the sub-root has children and none of them carries
    /// `action`: the tree and the authoritative game state have diverged,
    /// which is not recoverable.
    pub fn update(&mut self, action: &G::Action) {
        if !self.tree.get(self.sub_root).is_expanded() {
            self.sub_root = self.tree.add_child(self.sub_root, action.clone(), 1.0);
            return;
        }

        let children = self.tree.get(self.sub_root).children.clone();
        for id in children {
            if self.tree.get(id).action.as_ref() == Some(action) {
                self.sub_root = id;
                return;
            }
        }

        error!(action = %action, "action not found among sub-root children");
        panic!("search tree desynchronized from game state: action {action} not found");
    }

    /// The node corresponding to the current real position.
    pub fn sub_root(&self) -> NodeId {
        self.sub_root
    }

    /// Full tree, permanent root included, for inspection.
    pub fn tree(&self) -> &SearchTree<G::Action> {
        &self.tree
    }

    /// Aggregate statistics of the retained tree.
    pub fn stats(&self) -> TreeStats {
        self.tree.stats(self.sub_root)
    }

    /// Walks from the sub-root to a leaf, expanding it, and returns the
    /// visited path together with the value to back up.
    fn select_and_expand(
        &mut self,
        state: &mut G,
        noise: &[f64],
    ) -> Result<(Vec<NodeId>, f64), SearchError> {
        let mut current = self.sub_root;
        let mut path = vec![current];
        let mut at_sub_root = true;

        while !state.is_finished() {
            if !self.tree.get(current).is_expanded() {
                // Leaf: a single evaluation provides every child's prior and
                // the value backed up this iteration.
                let actions = state.legal_actions();
                let eval = state.evaluate(&actions)?;
                for (action, prior) in actions.into_iter().zip(eval.priors) {
                    self.tree.add_child(current, action, prior);
                }
                return Ok((path, f64::from(eval.value)));
            }

            let next = self.select_child(
                current,
                if at_sub_root { noise } else { &[] },
                G::UCT_C,
            );
            // Noise perturbs only the sub-root's own child selection.
            at_sub_root = false;

            path.push(next);
            let Some(action) = self.tree.get(next).action.clone() else {
                unreachable!("non-root nodes always hold an action");
            };
            state.apply_action(&action);
            current = next;
        }

        // Terminal mid-selection: value only, no expansion.
        let eval = state.evaluate(&[])?;
        Ok((path, f64::from(eval.value)))
    }

    /// UCB argmax over the children of `parent`; ties go to the lowest
    /// index. `noise` is blended into the priors only when it matches the
    /// child count, i.e. at the sub-root of a call that drew a non-empty
    /// sample.
    fn select_child(&self, parent: NodeId, noise: &[f64], c: f64) -> NodeId {
        let node = self.tree.get(parent);
        let parent_visits_sqrt = f64::from(node.visit_count).sqrt();
        let epsilon = self.config.dirichlet_epsilon;
        let blend = noise.len() == node.children.len();

        let mut best = node.children[0];
        let mut best_score = f64::NEG_INFINITY;
        for (i, &child_id) in node.children.iter().enumerate() {
            let child = self.tree.get(child_id);
            let prior = if blend {
                (1.0 - epsilon) * f64::from(child.prior) + epsilon * noise[i]
            } else {
                f64::from(child.prior)
            };
            let score = child.ucb_score(parent_visits_sqrt, c, prior);
            if score > best_score {
                best = child_id;
                best_score = score;
            }
        }
        best
    }

    /// Writes the evaluated value back along the visited path, sub-root
    /// through leaf inclusive.
    fn backpropagate(&mut self, path: &[NodeId], value: f64) {
        match self.config.sign_convention {
            SignConvention::Uniform => {
                for &id in path {
                    let node = self.tree.get_mut(id);
                    node.visit_count += 1;
                    node.value_sum += value;
                }
            }
            SignConvention::Alternating => {
                // The leaf keeps the evaluated sign; each step toward the
                // sub-root flips it.
                let mut signed = value;
                for &id in path.iter().rev() {
                    let node = self.tree.get_mut(id);
                    node.visit_count += 1;
                    node.value_sum += signed;
                    signed = -signed;
                }
            }
        }
    }

    fn decide_deterministic(&mut self) -> Result<Decision<G>, SearchError> {
        let ids = self.tree.get(self.sub_root).children.clone();
        let mut best = ids[0];
        for &id in &ids[1..] {
            if self.tree.get(id).visit_count > self.tree.get(best).visit_count {
                best = id;
            }
        }
        self.log_candidates(&ids, None);

        let Some(action) = self.tree.get(best).action.clone() else {
            unreachable!("non-root nodes always hold an action");
        };
        Ok(Decision {
            action,
            sample: None,
        })
    }

    fn decide_stochastic(&mut self, root_state: &G) -> Result<Decision<G>, SearchError> {
        let tau = self.config.temperature(root_state.turn());
        let pi = self.tree.visit_policy(self.sub_root, tau);
        if pi.iter().sum::<f64>() <= 0.0 {
            return Err(SearchError::DegeneratePolicy);
        }

        let ids = self.tree.get(self.sub_root).children.clone();
        let actions: Vec<G::Action> = ids
            .iter()
            .filter_map(|&id| self.tree.get(id).action.clone())
            .collect();
        let chosen = sample_index(&pi, &mut self.rng);
        self.log_candidates(&ids, Some(&pi));

        let sample = TrainingSample {
            state: root_state.encode_for_training(),
            policy: root_state.encode_policy_for_training(&actions, &pi),
        };
        Ok(Decision {
            action: actions[chosen].clone(),
            sample: Some(sample),
        })
    }

    /// Post-decision statistics, one line per sub-root child.
    fn log_candidates(&self, ids: &[NodeId], pi: Option<&[f64]>) {
        for (i, &id) in ids.iter().enumerate() {
            let child = self.tree.get(id);
            let Some(action) = child.action.as_ref() else {
                continue;
            };
            match pi {
                Some(pi) => debug!(
                    action = %action,
                    pi = pi[i],
                    w = child.value_sum,
                    n = child.visit_count,
                    q = child.q(),
                    "candidate"
                ),
                None => debug!(
                    action = %action,
                    w = child.value_sum,
                    n = child.visit_count,
                    q = child.q(),
                    "candidate"
                ),
            }
        }
    }
}

/// Dirichlet sample with concentration `alpha`, one component per sub-root
/// child; zero children yield an empty sample.
fn dirichlet_noise(n: usize, alpha: f64, rng: &mut ChaCha20Rng) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }

    let gamma = Gamma::new(alpha, 1.0).expect("Dirichlet concentration must be positive");
    let mut sample: Vec<f64> = (0..n).map(|_| gamma.sample(rng)).collect();

    let total: f64 = sample.iter().sum();
    if total > 0.0 {
        for s in &mut sample {
            *s /= total;
        }
    }
    sample
}

/// Samples an index from a normalized distribution.
fn sample_index(pi: &[f64], rng: &mut ChaCha20Rng) -> usize {
    let r: f64 = rng.gen();
    let mut acc = 0.0;
    for (i, &p) in pi.iter().enumerate() {
        acc += p;
        if r < acc {
            return i;
        }
    }

    // Rounding can leave the accumulated total a hair under 1.0.
    pi.iter().rposition(|&p| p > 0.0).unwrap_or(0)
}
