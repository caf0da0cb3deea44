//! The built referral tree.
//!
//! [`ReferralTree`] is an immutable arena produced by [`ReferralTree::build`].
//! It supports:
//!
//! - O(1) lookup of a node by user id
//! - Left-first pre-order traversal with an explicit stack, so very deep
//!   referral chains never hit call-depth limits
//! - Root-to-node paths via parent links
//! - Structural fingerprints (see [`ReferralTree::fingerprint`])
//!
//! A tree is never mutated after construction. New data produces a new tree;
//! see [`crate::SnapshotStore`] for publishing it to concurrent readers.

mod build;
mod hash;

pub use build::{build_tree, BuildOutcome, Diagnostic};

use serde::Serialize;
use std::collections::HashMap;

use crate::{error::Result, NodeId, SearchPath, TreeError, TreeNode};

/// A rooted binary referral tree.
#[derive(Clone, Debug)]
pub struct ReferralTree {
    /// Arena of placed nodes; the root is always at index 0
    nodes: Vec<TreeNode>,
    /// User id -> arena index
    index: HashMap<String, NodeId>,
    /// Deepest level reached (root = 1)
    max_depth: usize,
}

/// Autocomplete entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub user_id: String,
    pub name: String,
}

impl ReferralTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_node(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// Resolve a node handle produced by this tree.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different tree with more nodes.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// Arena index of a user, if placed in the tree.
    pub fn id_of(&self, user_id: &str) -> Option<NodeId> {
        self.index.get(user_id).copied()
    }

    /// Look up a placed user by id.
    pub fn get(&self, user_id: &str) -> Option<&TreeNode> {
        self.id_of(user_id).map(|id| self.node(id))
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.index.contains_key(user_id)
    }

    /// Number of placed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// False for every built tree: an empty map yields no tree at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Maximum depth with the root at depth 1.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Left-first pre-order traversal.
    pub fn preorder(&self) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![self.root()],
        }
    }

    /// Path from the root to `id`, both ends included.
    pub fn path_to(&self, id: NodeId) -> SearchPath {
        let mut path = Vec::with_capacity(self.node(id).depth);
        let mut current = Some(id);
        while let Some(node_id) = current {
            path.push(node_id);
            current = self.node(node_id).parent;
        }
        path.reverse();
        SearchPath::new(self, path)
    }

    /// Path from the root to the user with the given id.
    pub fn path_to_id(&self, user_id: &str) -> Result<SearchPath> {
        let id = self
            .id_of(user_id)
            .ok_or_else(|| TreeError::UnknownNode(user_id.to_string()))?;
        Ok(self.path_to(id))
    }

    /// Flat `{userId, name}` list in pre-order for autocomplete.
    pub fn suggestions(&self, limit: Option<usize>) -> Vec<Suggestion> {
        self.preorder()
            .take(limit.unwrap_or(usize::MAX))
            .map(|id| {
                let node = self.node(id);
                Suggestion {
                    user_id: node.user_id.clone(),
                    name: node.name.clone(),
                }
            })
            .collect()
    }
}

/// Maximum depth of an optional tree; 0 when there is no tree.
pub fn max_depth(tree: Option<&ReferralTree>) -> usize {
    tree.map_or(0, ReferralTree::max_depth)
}

/// Iterator over node ids in left-first pre-order.
pub struct PreOrder<'a> {
    tree: &'a ReferralTree,
    stack: Vec<NodeId>,
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        // Right pushed first so left is visited first
        if let Some(right) = node.right {
            self.stack.push(right);
        }
        if let Some(left) = node.left {
            self.stack.push(left);
        }
        Some(id)
    }
}
