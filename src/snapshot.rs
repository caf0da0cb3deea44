//! Immutable snapshots for concurrent readers.
//!
//! Every data update builds a complete new tree off to the side and then
//! swaps a single `Arc` pointer. Readers clone the `Arc` and query at their
//! own pace; an in-flight query keeps its snapshot alive and never observes a
//! half-built tree.

use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::{
    build_tree, find_empty_slots, max_depth, search, BuildOutcome, Diagnostic, EmptySlot, FlatMap,
    Fingerprint, ReferralTree, SearchPath,
};

/// A built tree with its derived data, computed once at publish time.
#[derive(Debug)]
pub struct TreeSnapshot {
    generation: u64,
    outcome: BuildOutcome,
    max_depth: usize,
    empty_slots: Vec<EmptySlot>,
    fingerprint: Option<Fingerprint>,
    content_fingerprint: Option<Fingerprint>,
}

impl TreeSnapshot {
    fn new(generation: u64, outcome: BuildOutcome) -> Self {
        let tree = outcome.tree.as_ref();
        Self {
            generation,
            max_depth: max_depth(tree),
            empty_slots: find_empty_slots(tree),
            fingerprint: tree.map(ReferralTree::fingerprint),
            content_fingerprint: tree.map(ReferralTree::content_fingerprint),
            outcome,
        }
    }

    /// Publish counter; 0 is the initial empty snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tree(&self) -> Option<&ReferralTree> {
        self.outcome.tree.as_ref()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Empty slots in pre-order.
    pub fn empty_slots(&self) -> &[EmptySlot] {
        &self.empty_slots
    }

    /// Shape fingerprint; `None` when there is no tree.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    /// Shape plus names and payload; `None` when there is no tree.
    pub fn content_fingerprint(&self) -> Option<Fingerprint> {
        self.content_fingerprint
    }

    pub fn root_selection_ambiguous(&self) -> bool {
        self.outcome.root_selection_ambiguous
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.outcome.diagnostics
    }

    pub fn search(&self, query: &str) -> Vec<SearchPath> {
        search(self.tree(), query)
    }
}

/// What a publish did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishReport {
    pub generation: u64,
    /// Parent/child/position relations differ from the previous snapshot
    pub shape_changed: bool,
    /// Anything a view renders differs: shape, a name or a payload field
    pub content_changed: bool,
    pub node_count: usize,
}

/// Holder of the current snapshot.
#[derive(Debug)]
pub struct SnapshotStore {
    current: RwLock<Arc<TreeSnapshot>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Store holding an empty snapshot at generation 0.
    pub fn new() -> Self {
        let empty = TreeSnapshot::new(0, build_tree(&FlatMap::new()));
        Self {
            current: RwLock::new(Arc::new(empty)),
        }
    }

    /// The current snapshot.
    pub fn load(&self) -> Arc<TreeSnapshot> {
        // Only a pointer is stored, so a poisoned lock still holds a whole snapshot
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Build from `map` and make the result current.
    pub fn publish(&self, map: &FlatMap) -> PublishReport {
        // All derived data is computed before the lock is taken
        let mut snapshot = TreeSnapshot::new(0, build_tree(map));

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        snapshot.generation = guard.generation + 1;
        let report = PublishReport {
            generation: snapshot.generation,
            shape_changed: snapshot.fingerprint != guard.fingerprint,
            content_changed: snapshot.content_fingerprint != guard.content_fingerprint,
            node_count: snapshot.tree().map_or(0, ReferralTree::len),
        };
        *guard = Arc::new(snapshot);
        drop(guard);

        debug!(
            generation = report.generation,
            shape_changed = report.shape_changed,
            content_changed = report.content_changed,
            nodes = report.node_count,
            "published tree snapshot"
        );
        report
    }
}
