//! Per-node expansion state for collapsible tree views.
//!
//! [`ExpansionState`] is a plain value: the view owns it and passes it the
//! current tree whenever a transition needs depths or paths. It never holds a
//! reference to a tree, so it survives rebuilds (see
//! [`ExpansionState::retain_known`]).
//!
//! | Mode | Map contents |
//! |------|--------------|
//! | `Full` | every node expanded |
//! | `DepthLimited(n)` | node expanded iff depth < n |
//! | `Custom` | whatever toggles and reveals left behind |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{error::Result, NodeId, Position, ReferralTree, SearchPath, ViewConfig};

/// How the expansion map is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "maxLevel", rename_all = "camelCase")]
pub enum ViewMode {
    Full,
    DepthLimited(usize),
    Custom,
}

/// Expanded flag per user id plus the mode that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionState {
    mode: ViewMode,
    expanded: BTreeMap<String, bool>,
}

impl ExpansionState {
    /// State for a freshly built tree, per `config.initial_expand_depth`.
    pub fn initial(tree: &ReferralTree, config: &ViewConfig) -> Self {
        Self::with_mode(tree, ViewMode::DepthLimited(config.initial_expand_depth))
    }

    /// State derived from `mode`. `Custom` starts with nothing expanded.
    pub fn with_mode(tree: &ReferralTree, mode: ViewMode) -> Self {
        let mut state = Self {
            mode: ViewMode::Custom,
            expanded: BTreeMap::new(),
        };
        state.set_mode(tree, mode);
        state
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// The raw map, for handing to a renderer.
    pub fn expanded(&self) -> &BTreeMap<String, bool> {
        &self.expanded
    }

    /// Unknown ids are collapsed.
    pub fn is_expanded(&self, user_id: &str) -> bool {
        self.expanded.get(user_id).copied().unwrap_or(false)
    }

    /// Switch mode. `Full` and `DepthLimited` rebuild the whole map from
    /// depths; `Custom` keeps the current map as is.
    pub fn set_mode(&mut self, tree: &ReferralTree, mode: ViewMode) {
        self.mode = mode;
        let max_level = match mode {
            ViewMode::Custom => return,
            ViewMode::Full => usize::MAX,
            ViewMode::DepthLimited(max) => max,
        };

        self.expanded = tree
            .preorder()
            .map(|id| {
                let node = tree.node(id);
                (node.user_id.clone(), node.depth < max_level)
            })
            .collect();
    }

    /// Flip one node and switch to `Custom`. Returns the new flag.
    pub fn toggle(&mut self, user_id: &str) -> bool {
        self.mode = ViewMode::Custom;
        let flag = self.expanded.entry(user_id.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Expand the path to the node `path` ends at and switch to `Custom`,
    /// keeping all other entries.
    ///
    /// The target is looked up by user id in `tree`, so a path from an older
    /// snapshot reveals the user wherever it sits now. A target missing from
    /// `tree` is [`TreeError::UnknownNode`](crate::TreeError::UnknownNode) and leaves the state untouched.
    pub fn reveal_path(&mut self, tree: &ReferralTree, path: &SearchPath) -> Result<()> {
        let current = resolve(tree, path)?;
        self.expand_along(tree, current.iter());
        Ok(())
    }

    /// Expand the paths of every search match. All targets must be in `tree`;
    /// otherwise nothing changes.
    pub fn reveal_search(&mut self, tree: &ReferralTree, paths: &[SearchPath]) -> Result<()> {
        let current = paths
            .iter()
            .map(|path| resolve(tree, path))
            .collect::<Result<Vec<_>>>()?;
        self.expand_along(tree, current.iter().flatten());
        Ok(())
    }

    /// Expand the path to a node, e.g. to jump to an empty slot's parent.
    pub fn reveal_node(&mut self, tree: &ReferralTree, user_id: &str) -> Result<()> {
        let path = tree.path_to_id(user_id)?;
        self.expand_along(tree, std::iter::once(&path));
        Ok(())
    }

    fn expand_along<'a>(&mut self, tree: &ReferralTree, paths: impl Iterator<Item = &'a SearchPath>) {
        self.mode = ViewMode::Custom;
        for path in paths {
            for id in path.ids() {
                self.expanded.insert(tree.node(*id).user_id.clone(), true);
            }
        }
    }

    /// A node is visible when every ancestor is expanded. The root always is.
    pub fn is_visible(&self, tree: &ReferralTree, user_id: &str) -> Result<bool> {
        let path = tree.path_to_id(user_id)?;
        let ids = path.ids();
        Ok(ids[..ids.len() - 1]
            .iter()
            .all(|id| self.is_expanded(&tree.node(*id).user_id)))
    }

    /// Visible nodes in left-first pre-order.
    pub fn visible_nodes(&self, tree: &ReferralTree) -> Vec<NodeId> {
        let mut visible = Vec::new();
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            visible.push(id);
            let node = tree.node(id);
            if !self.is_expanded(&node.user_id) {
                continue;
            }
            for position in [Position::Right, Position::Left] {
                if let Some(child) = node.child(position) {
                    stack.push(child);
                }
            }
        }
        visible
    }

    /// Carry state over to a rebuilt tree.
    ///
    /// Derived modes are recomputed; `Custom` drops ids no longer present and
    /// keeps every other choice.
    pub fn retain_known(&mut self, tree: &ReferralTree) {
        match self.mode {
            ViewMode::Custom => self.expanded.retain(|id, _| tree.contains(id)),
            mode => self.set_mode(tree, mode),
        }
    }
}

/// The path to `path`'s target in `tree`; `None` for an empty path.
fn resolve(tree: &ReferralTree, path: &SearchPath) -> Result<Option<SearchPath>> {
    path.target_user_id()
        .map(|user_id| tree.path_to_id(user_id))
        .transpose()
}
