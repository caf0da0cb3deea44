//! Text search over a built tree.
//!
//! A query matches a node when it is a case-insensitive substring of the
//! node's display name or user id. Every match yields the full path from the
//! root, so a view can expand the ancestors and bring the match into sight.

use crate::{NodeId, ReferralTree};

/// Root-to-node walk ending at a match.
///
/// Node ids index the arena of the tree that produced the path; user ids stay
/// meaningful across rebuilds. Anything that outlives a snapshot, such as
/// expansion state, goes through the user ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchPath {
    ids: Vec<NodeId>,
    user_ids: Vec<String>,
}

impl SearchPath {
    pub(crate) fn new(tree: &ReferralTree, ids: Vec<NodeId>) -> Self {
        let user_ids = ids.iter().map(|id| tree.node(*id).user_id.clone()).collect();
        Self { ids, user_ids }
    }

    /// Arena ids from root to target, valid only in the producing tree.
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    /// User ids from root to target.
    pub fn user_ids(&self) -> Vec<&str> {
        self.user_ids.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The matched node.
    pub fn target(&self) -> Option<NodeId> {
        self.ids.last().copied()
    }

    /// User id of the matched node.
    pub fn target_user_id(&self) -> Option<&str> {
        self.user_ids.last().map(String::as_str)
    }
}

impl ReferralTree {
    /// All matches of `query` in pre-order, one path per matching node.
    ///
    /// Blank queries match nothing. Descendants of a match are still searched.
    pub fn search(&self, query: &str) -> Vec<SearchPath> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        let mut path: Vec<NodeId> = Vec::with_capacity(self.max_depth());
        let mut stack = vec![self.root()];

        while let Some(id) = stack.pop() {
            let node = self.node(id);
            // Stack order is pre-order, so depth tells how much of the path survives
            path.truncate(node.depth - 1);
            path.push(id);

            if node.matches_lowercase(&needle) {
                results.push(SearchPath::new(self, path.clone()));
            }

            if let Some(right) = node.right {
                stack.push(right);
            }
            if let Some(left) = node.left {
                stack.push(left);
            }
        }

        results
    }
}

/// Search an optional tree; nothing when there is no tree.
pub fn search(tree: Option<&ReferralTree>, query: &str) -> Vec<SearchPath> {
    tree.map(|t| t.search(query)).unwrap_or_default()
}
