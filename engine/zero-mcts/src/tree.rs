//! Arena-backed search tree.
//!
//! Nodes live in one contiguous `Vec` and reference their children by index,
//! so the tree is a rooted forest with no shared ownership and no cycles.
//! Re-rooting on tree reuse is just moving the sub-root index; abandoned
//! sibling subtrees stay allocated but unreachable, available for
//! inspection and never searched again.

use crate::node::{Node, NodeId};

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct SearchTree<A> {
    /// Arena storing all nodes
    nodes: Vec<Node<A>>,

    /// Root node index (always 0 after construction)
    root: NodeId,
}

impl<A> SearchTree<A> {
    /// Creates a tree holding only the artificial root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new_root()],
            root: NodeId(0),
        }
    }

    /// The artificial root, kept for the lifetime of the engine.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &Node<A> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<A> {
        &mut self.nodes[id.0 as usize]
    }

    /// Total number of nodes ever allocated, reachable or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a child of `parent` and appends it to the parent's ordered
    /// child list.
    pub fn add_child(&mut self, parent: NodeId, action: A, prior: f32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new_child(action, prior));
        self.get_mut(parent).children.push(id);
        id
    }

    /// Temperature distribution over the children of `parent`.
    ///
    /// `pi_i` is proportional to `visit_count_i^(1/tau)`, aligned with the
    /// child order. All-zero visit counts produce an all-zero vector;
    /// callers decide how to fail.
    pub fn visit_policy(&self, parent: NodeId, tau: f64) -> Vec<f64> {
        let mut pi: Vec<f64> = self
            .get(parent)
            .children
            .iter()
            .map(|&id| {
                let n = f64::from(self.get(id).visit_count);
                if tau == 1.0 {
                    n
                } else {
                    n.powf(1.0 / tau)
                }
            })
            .collect();

        let total: f64 = pi.iter().sum();
        if total > 0.0 {
            for p in &mut pi {
                *p /= total;
            }
        }
        pi
    }

    /// Aggregate statistics for diagnostics.
    pub fn stats(&self, sub_root: NodeId) -> TreeStats {
        let anchor = self.get(sub_root);
        TreeStats {
            total_nodes: self.nodes.len(),
            sub_root_visits: anchor.visit_count,
            sub_root_value: anchor.q(),
            max_depth: self.max_depth(self.root, 0),
        }
    }

    fn max_depth(&self, id: NodeId, depth: u32) -> u32 {
        self.get(id)
            .children
            .iter()
            .map(|&child| self.max_depth(child, depth + 1))
            .max()
            .unwrap_or(depth)
    }
}

impl<A> Default for SearchTree<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub sub_root_visits: u32,
    pub sub_root_value: f64,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tree() {
        let tree: SearchTree<u8> = SearchTree::new();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        assert!(tree.get(tree.root()).action.is_none());
    }

    #[test]
    fn test_add_child_preserves_order() {
        let mut tree = SearchTree::new();
        let a = tree.add_child(tree.root(), 7u8, 0.3);
        let b = tree.add_child(tree.root(), 2u8, 0.7);

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(tree.root()).children, vec![a, b]);
        assert_eq!(tree.get(a).action, Some(7));
        assert_eq!(tree.get(b).action, Some(2));
    }

    #[test]
    fn test_visit_policy_proportional() {
        let mut tree = SearchTree::new();
        for (action, visits) in [(0u8, 10u32), (1, 30), (2, 60)] {
            let id = tree.add_child(tree.root(), action, 0.0);
            tree.get_mut(id).visit_count = visits;
        }

        let pi = tree.visit_policy(tree.root(), 1.0);
        assert!((pi[0] - 0.10).abs() < 1e-6);
        assert!((pi[1] - 0.30).abs() < 1e-6);
        assert!((pi[2] - 0.60).abs() < 1e-6);
    }

    #[test]
    fn test_visit_policy_low_temperature_concentrates() {
        let mut tree = SearchTree::new();
        for (action, visits) in [(0u8, 10u32), (1, 30), (2, 60)] {
            let id = tree.add_child(tree.root(), action, 0.0);
            tree.get_mut(id).visit_count = visits;
        }

        let pi = tree.visit_policy(tree.root(), 0.05);
        assert!(pi[2] > 0.99);
        assert!((pi.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_visit_policy_unvisited_is_zero() {
        let mut tree = SearchTree::new();
        tree.add_child(tree.root(), 0u8, 0.5);
        tree.add_child(tree.root(), 1u8, 0.5);

        let pi = tree.visit_policy(tree.root(), 1.0);
        assert_eq!(pi, vec![0.0, 0.0]);
    }

    #[test]
    fn test_stats() {
        let mut tree = SearchTree::new();
        let child = tree.add_child(tree.root(), 0u8, 0.5);
        tree.add_child(child, 1u8, 0.5);
        tree.get_mut(child).visit_count = 3;
        tree.get_mut(child).value_sum = 1.5;

        let stats = tree.stats(child);
        assert_eq!(stats.total_nodes, 3);
        assert_eq!(stats.sub_root_visits, 3);
        assert!((stats.sub_root_value - 0.5).abs() < 1e-6);
        assert_eq!(stats.max_depth, 2);
    }
}
