//! Tree construction from a flat map.
//!
//! Construction never fails. Problems in the input are recovered from and
//! reported as [`Diagnostic`]s:
//!
//! - a child id missing from the map is treated as an empty slot
//! - a child claimed by two parents stays with the one its `referralId` names,
//!   or else with the first claimant in map order
//! - edges leading back to an already placed node are dropped
//! - if there is not exactly one parentless record, the root falls back to the
//!   first parentless record (or the first record) and the outcome is flagged

use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::{FlatMap, NodeId, Position, TreeNode, UserRecord};

use super::ReferralTree;

/// Recoverable input problem found while building.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// Not exactly one parentless record; `chosen` was used as root
    RootFallback { chosen: String, candidates: usize },
    /// Child id does not exist in the map
    DanglingChild {
        parent: String,
        position: Position,
        child: String,
    },
    /// Record names itself as a child
    SelfReference { user_id: String, position: Position },
    /// Child also claimed by `kept_parent`, which won the claim
    DuplicateChild {
        child: String,
        kept_parent: String,
        dropped_parent: String,
        position: Position,
    },
    /// Edge points back at a node already placed. Claims are unique, so
    /// every other node is reached through one edge and this is the root.
    CycleSkipped {
        parent: String,
        position: Position,
        child: String,
    },
    /// Records not reachable from the chosen root, in map order
    Unreachable { user_ids: Vec<String> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootFallback { chosen, candidates } => write!(
                f,
                "{candidates} parentless records, using {chosen} as root"
            ),
            Self::DanglingChild { parent, position, child } => {
                write!(f, "{parent}.{position} references missing user {child}")
            }
            Self::SelfReference { user_id, position } => {
                write!(f, "{user_id}.{position} references itself")
            }
            Self::DuplicateChild { child, kept_parent, dropped_parent, position } => write!(
                f,
                "{child} claimed by {kept_parent} and {dropped_parent}.{position}, keeping {kept_parent}"
            ),
            Self::CycleSkipped { parent, position, child } => {
                write!(f, "{parent}.{position} -> {child} closes a cycle")
            }
            Self::Unreachable { user_ids } => {
                write!(f, "{} records unreachable from root", user_ids.len())
            }
        }
    }
}

/// Result of building a tree.
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    /// `None` iff the input map was empty
    pub tree: Option<ReferralTree>,
    /// True when the root was not the single parentless record
    pub root_selection_ambiguous: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutcome {
    fn empty() -> Self {
        Self {
            tree: None,
            root_selection_ambiguous: false,
            diagnostics: Vec::new(),
        }
    }

    /// True if the input needed no recovery at all.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl ReferralTree {
    /// Build a tree from a flat map.
    pub fn build(map: &FlatMap) -> BuildOutcome {
        if map.is_empty() {
            return BuildOutcome::empty();
        }

        let records: Vec<(&str, &UserRecord)> = map.iter().collect();
        let mut diagnostics = Vec::new();

        let edges = resolve_claims(map, &records, &mut diagnostics);
        let (root, root_selection_ambiguous) = select_root(&records, &mut diagnostics);

        // Walk owned edges from the root, creating arena nodes on discovery
        let mut placed: Vec<Option<NodeId>> = vec![None; records.len()];
        let mut nodes = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());
        let mut max_depth = 1;

        let mut root_node = new_node(records[root]);
        root_node.depth = 1;
        nodes.push(root_node);
        placed[root] = Some(NodeId(0));
        index.insert(records[root].0.to_string(), NodeId(0));

        let mut stack = vec![(root, NodeId(0))];
        while let Some((parent, parent_id)) = stack.pop() {
            for position in Position::BOTH {
                let Some(child) = edges[parent][slot(position)] else {
                    continue;
                };
                if placed[child].is_some() {
                    diagnostics.push(Diagnostic::CycleSkipped {
                        parent: records[parent].0.to_string(),
                        position,
                        child: records[child].0.to_string(),
                    });
                    continue;
                }

                let child_id = NodeId(nodes.len());
                let mut node = new_node(records[child]);
                node.position = Some(position);
                node.parent = Some(parent_id);
                node.depth = nodes[parent_id.0].depth + 1;
                max_depth = max_depth.max(node.depth);

                nodes[parent_id.0].set_child(position, child_id);
                index.insert(records[child].0.to_string(), child_id);
                nodes.push(node);
                placed[child] = Some(child_id);
                stack.push((child, child_id));
            }
        }

        let unreachable: Vec<String> = records
            .iter()
            .zip(&placed)
            .filter(|(_, p)| p.is_none())
            .map(|((id, _), _)| id.to_string())
            .collect();
        if !unreachable.is_empty() {
            diagnostics.push(Diagnostic::Unreachable { user_ids: unreachable });
        }

        for diagnostic in &diagnostics {
            debug!(%diagnostic, "tree build diagnostic");
        }
        debug!(
            records = records.len(),
            placed = nodes.len(),
            max_depth,
            diagnostics = diagnostics.len(),
            "built referral tree"
        );

        BuildOutcome {
            tree: Some(ReferralTree { nodes, index, max_depth }),
            root_selection_ambiguous,
            diagnostics,
        }
    }
}

/// Build a tree from a flat map. See [`ReferralTree::build`].
pub fn build_tree(map: &FlatMap) -> BuildOutcome {
    ReferralTree::build(map)
}

fn slot(position: Position) -> usize {
    match position {
        Position::Left => 0,
        Position::Right => 1,
    }
}

fn new_node((user_id, record): (&str, &UserRecord)) -> TreeNode {
    TreeNode::new(user_id.to_string(), record.name.clone(), record.payload.clone())
}

/// Resolve child references to source indices.
///
/// A child claimed by several parents goes to the claimant its own
/// `referral_id` names. Without such a claimant the first claim in map order
/// wins.
fn resolve_claims(
    map: &FlatMap,
    records: &[(&str, &UserRecord)],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<[Option<usize>; 2]> {
    let mut claims: Vec<Vec<(usize, Position)>> = vec![Vec::new(); records.len()];

    for (parent, (parent_id, record)) in records.iter().enumerate() {
        for position in Position::BOTH {
            let child_ref = match position {
                Position::Left => record.left_child.as_deref(),
                Position::Right => record.right_child.as_deref(),
            };
            let Some(child_ref) = child_ref else {
                continue;
            };
            let Some(child) = map.index_of(child_ref) else {
                diagnostics.push(Diagnostic::DanglingChild {
                    parent: parent_id.to_string(),
                    position,
                    child: child_ref.to_string(),
                });
                continue;
            };
            if child == parent {
                diagnostics.push(Diagnostic::SelfReference {
                    user_id: parent_id.to_string(),
                    position,
                });
                continue;
            }
            claims[child].push((parent, position));
        }
    }

    let mut edges = vec![[None, None]; records.len()];
    for (child, claimants) in claims.iter().enumerate() {
        if claimants.is_empty() {
            continue;
        }
        let (child_id, child_record) = records[child];
        let named = child_record.referral_id.as_deref();
        let kept = claimants
            .iter()
            .position(|(parent, _)| Some(records[*parent].0) == named)
            .unwrap_or(0);

        let (owner, position) = claimants[kept];
        edges[owner][slot(position)] = Some(child);

        for (i, (dropped, position)) in claimants.iter().enumerate() {
            if i == kept {
                continue;
            }
            diagnostics.push(Diagnostic::DuplicateChild {
                child: child_id.to_string(),
                kept_parent: records[owner].0.to_string(),
                dropped_parent: records[*dropped].0.to_string(),
                position: *position,
            });
        }
    }

    edges
}

/// Pick the root source index; the flag is set when a fallback was needed.
fn select_root(records: &[(&str, &UserRecord)], diagnostics: &mut Vec<Diagnostic>) -> (usize, bool) {
    let candidates: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, (_, record))| record.is_parentless())
        .map(|(i, _)| i)
        .collect();

    if let [single] = candidates.as_slice() {
        return (*single, false);
    }

    let chosen = candidates.first().copied().unwrap_or(0);
    warn!(
        candidates = candidates.len(),
        chosen = records[chosen].0,
        "no unique parentless record, falling back"
    );
    diagnostics.push(Diagnostic::RootFallback {
        chosen: records[chosen].0.to_string(),
        candidates: candidates.len(),
    });
    (chosen, true)
}
