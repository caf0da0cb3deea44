//! Invariant checking for referral tree simulation testing.
//!
//! The reference model tracks the intended tree as explicit parent links. The
//! key invariant: a snapshot published from the model's flat map must agree
//! with the model on membership, positions, depths, empty slots and search.

use referral_tree::{FlatMap, Position, TreeSnapshot, UserRecord};
use std::collections::BTreeMap;

/// A violation of an expected invariant during simulation.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub operation_index: usize,
    pub description: String,
    pub expected: String,
    pub actual: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invariant violation at op {}: {} (expected: {}, actual: {})",
            self.operation_index, self.description, self.expected, self.actual
        )
    }
}

impl std::error::Error for InvariantViolation {}

/// Mutations of the referral graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOperation {
    /// Place a new user in an open slot (or as root of an empty model)
    AddUser {
        id: String,
        name: String,
        parent: Option<(String, Position)>,
    },
    /// Remove a user with no children
    RemoveLeaf { id: String },
    Rename { id: String, name: String },
}

#[derive(Debug, Clone)]
struct ModelEntry {
    name: String,
    parent: Option<(String, Position)>,
    left: Option<String>,
    right: Option<String>,
}

/// Reference model of the referral tree using BTreeMap.
#[derive(Debug, Clone, Default)]
pub struct ReferenceModel {
    users: BTreeMap<String, ModelEntry>,
    /// Insertion order, used as wire order
    order: Vec<String>,
}

impl ReferenceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, op: &TreeOperation) {
        match op {
            TreeOperation::AddUser { id, name, parent } => {
                if let Some((parent_id, position)) = parent {
                    let Some(entry) = self.users.get_mut(parent_id) else {
                        return;
                    };
                    match position {
                        Position::Left => entry.left = Some(id.clone()),
                        Position::Right => entry.right = Some(id.clone()),
                    }
                }
                self.users.insert(
                    id.clone(),
                    ModelEntry {
                        name: name.clone(),
                        parent: parent.clone(),
                        left: None,
                        right: None,
                    },
                );
                self.order.push(id.clone());
            }
            TreeOperation::RemoveLeaf { id } => {
                let Some(entry) = self.users.remove(id) else {
                    return;
                };
                if let Some((parent_id, position)) = entry.parent {
                    if let Some(parent) = self.users.get_mut(&parent_id) {
                        match position {
                            Position::Left => parent.left = None,
                            Position::Right => parent.right = None,
                        }
                    }
                }
                self.order.retain(|u| u != id);
            }
            TreeOperation::Rename { id, name } => {
                if let Some(entry) = self.users.get_mut(id) {
                    entry.name = name.clone();
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.users.get(id).map(|e| e.name.as_str())
    }

    pub fn user_ids(&self) -> &[String] {
        &self.order
    }

    /// Users with no children.
    pub fn leaves(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| {
                let e = &self.users[*id];
                e.left.is_none() && e.right.is_none()
            })
            .cloned()
            .collect()
    }

    /// Every `(parent, position)` with no occupant, in wire order.
    pub fn open_slots(&self) -> Vec<(String, Position)> {
        let mut slots = Vec::new();
        for id in &self.order {
            let e = &self.users[id];
            if e.left.is_none() {
                slots.push((id.clone(), Position::Left));
            }
            if e.right.is_none() {
                slots.push((id.clone(), Position::Right));
            }
        }
        slots
    }

    pub fn depth(&self, id: &str) -> usize {
        let mut depth = 1;
        let mut current = &self.users[id];
        while let Some((parent, _)) = &current.parent {
            depth += 1;
            current = &self.users[parent];
        }
        depth
    }

    pub fn max_depth(&self) -> usize {
        self.order.iter().map(|id| self.depth(id)).max().unwrap_or(0)
    }

    /// Wire representation in insertion order.
    pub fn to_flat_map(&self) -> FlatMap {
        self.order
            .iter()
            .map(|id| {
                let e = &self.users[id];
                let mut record = UserRecord::new(e.name.clone());
                record.left_child = e.left.clone();
                record.right_child = e.right.clone();
                record.referral_id = e.parent.as_ref().map(|(p, _)| p.clone());
                (id.clone(), record)
            })
            .collect()
    }

    /// Ids whose name or id contains `query`, case-insensitive.
    pub fn expected_matches(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.order
            .iter()
            .filter(|id| {
                id.to_lowercase().contains(&needle)
                    || self.users[*id].name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }
}

/// Checks a published snapshot against the reference model.
pub struct SnapshotChecker {
    operation_index: usize,
}

impl Default for SnapshotChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotChecker {
    pub fn new() -> Self {
        Self { operation_index: 0 }
    }

    pub fn set_operation_index(&mut self, index: usize) {
        self.operation_index = index;
    }

    fn violation(&self, description: impl Into<String>, expected: impl std::fmt::Debug, actual: impl std::fmt::Debug) -> InvariantViolation {
        InvariantViolation {
            operation_index: self.operation_index,
            description: description.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    pub fn verify_snapshot(
        &self,
        snapshot: &TreeSnapshot,
        model: &ReferenceModel,
    ) -> Result<(), InvariantViolation> {
        let Some(tree) = snapshot.tree() else {
            if model.is_empty() {
                return Ok(());
            }
            return Err(self.violation("Missing tree", model.len(), 0));
        };

        if tree.len() != model.len() {
            return Err(self.violation("Node count mismatch", model.len(), tree.len()));
        }
        if snapshot.max_depth() != model.max_depth() {
            return Err(self.violation("Max depth mismatch", model.max_depth(), snapshot.max_depth()));
        }

        for id in model.user_ids() {
            let Some(node) = tree.get(id) else {
                return Err(self.violation("User missing from tree", id, "absent"));
            };
            let expected_position = model.users[id].parent.as_ref().map(|(_, p)| *p);
            if node.position != expected_position {
                return Err(self.violation(format!("Position mismatch for {id}"), expected_position, node.position));
            }
            if node.depth != model.depth(id) {
                return Err(self.violation(format!("Depth mismatch for {id}"), model.depth(id), node.depth));
            }
        }

        let expected_open = model.open_slots().len();
        let actual_open: usize = snapshot
            .empty_slots()
            .iter()
            .map(|s| s.available_positions.len())
            .sum();
        if expected_open != actual_open {
            return Err(self.violation("Open slot count mismatch", expected_open, actual_open));
        }

        Ok(())
    }

    pub fn verify_search(
        &self,
        snapshot: &TreeSnapshot,
        model: &ReferenceModel,
        query: &str,
    ) -> Result<(), InvariantViolation> {
        let mut expected = model.expected_matches(query);
        let mut actual: Vec<String> = match snapshot.tree() {
            Some(tree) => snapshot
                .search(query)
                .iter()
                .map(|p| tree.node(p.target().unwrap()).user_id.clone())
                .collect(),
            None => Vec::new(),
        };
        // Model order is wire order, search order is pre-order
        expected.sort();
        actual.sort();
        if expected != actual {
            return Err(self.violation(format!("Search mismatch for {query:?}"), expected, actual));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use referral_tree::SnapshotStore;

    fn add(id: &str, parent: Option<(&str, Position)>) -> TreeOperation {
        TreeOperation::AddUser {
            id: id.to_string(),
            name: format!("name {id}"),
            parent: parent.map(|(p, pos)| (p.to_string(), pos)),
        }
    }

    #[test]
    fn test_model_add_remove() {
        let mut model = ReferenceModel::new();
        model.apply(&add("a", None));
        model.apply(&add("b", Some(("a", Position::Left))));
        assert_eq!(model.len(), 2);
        assert_eq!(model.max_depth(), 2);
        assert_eq!(model.open_slots().len(), 3);

        model.apply(&TreeOperation::RemoveLeaf { id: "b".into() });
        assert_eq!(model.len(), 1);
        assert_eq!(model.open_slots().len(), 2);
    }

    #[test]
    fn test_checker_accepts_matching_snapshot() {
        let mut model = ReferenceModel::new();
        model.apply(&add("a", None));
        model.apply(&add("b", Some(("a", Position::Right))));

        let store = SnapshotStore::new();
        store.publish(&model.to_flat_map());
        let checker = SnapshotChecker::new();
        assert!(checker.verify_snapshot(&store.load(), &model).is_ok());
        assert!(checker.verify_search(&store.load(), &model, "name b").is_ok());
    }

    #[test]
    fn test_checker_rejects_stale_snapshot() {
        let mut model = ReferenceModel::new();
        model.apply(&add("a", None));
        let store = SnapshotStore::new();
        store.publish(&model.to_flat_map());

        model.apply(&add("b", Some(("a", Position::Left))));
        let checker = SnapshotChecker::new();
        assert!(checker.verify_snapshot(&store.load(), &model).is_err());
    }
}
