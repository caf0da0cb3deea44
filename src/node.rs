//! Tree node types.
//!
//! Nodes live in an arena owned by [`crate::ReferralTree`] and refer to each
//! other by [`NodeId`]. Every parent -> child edge carries an explicit
//! [`Position`]; a node has at most one child per position.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Slot of a child under its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
}

impl Position {
    /// Both positions, left first.
    pub const BOTH: [Position; 2] = [Position::Left, Position::Right];

    /// The other slot.
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of a node in its tree's arena.
///
/// Only meaningful for the tree that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A user placed in the tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub user_id: String,
    pub name: String,
    /// Opaque business fields copied from the source record
    pub payload: BTreeMap<String, Value>,
    /// Slot under the parent; `None` only for the root
    pub position: Option<Position>,
    /// 1-based depth, root = 1
    pub depth: usize,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    #[serde(skip)]
    pub(crate) left: Option<NodeId>,
    #[serde(skip)]
    pub(crate) right: Option<NodeId>,
}

impl TreeNode {
    pub(crate) fn new(user_id: String, name: String, payload: BTreeMap<String, Value>) -> Self {
        Self {
            user_id,
            name,
            payload,
            position: None,
            depth: 0,
            parent: None,
            left: None,
            right: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child occupying the given slot.
    pub fn child(&self, position: Position) -> Option<NodeId> {
        match position {
            Position::Left => self.left,
            Position::Right => self.right,
        }
    }

    pub(crate) fn set_child(&mut self, position: Position, child: NodeId) {
        match position {
            Position::Left => self.left = Some(child),
            Position::Right => self.right = Some(child),
        }
    }

    /// Present children with their slots, left first.
    pub fn children(&self) -> impl Iterator<Item = (Position, NodeId)> + '_ {
        Position::BOTH
            .into_iter()
            .filter_map(move |p| self.child(p).map(|id| (p, id)))
    }

    /// Number of occupied slots (0, 1 or 2).
    pub fn child_count(&self) -> usize {
        self.left.is_some() as usize + self.right.is_some() as usize
    }

    /// Slots with no occupant, left first.
    pub fn open_positions(&self) -> Vec<Position> {
        Position::BOTH
            .into_iter()
            .filter(|p| self.child(*p).is_none())
            .collect()
    }

    pub fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }

    /// Case-insensitive substring match against name or user id.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.user_id.to_lowercase().contains(needle)
    }
}
