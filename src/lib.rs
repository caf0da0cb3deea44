//! # Referral Tree
//!
//! Reconstruction and querying of binary referral trees for admin views.
//!
//! The backend delivers the referral graph as a flat map keyed by user id,
//! where each record names its left and right child by id. This crate turns
//! that map into a rooted binary tree and answers the questions a tree view
//! asks of it:
//!
//! - **Build**: [`build_tree`] reconstructs the tree, recovering from
//!   malformed input and reporting what it recovered from as [`Diagnostic`]s
//! - **Depth**: [`max_depth`], root at depth 1
//! - **Empty slots**: [`find_empty_slots`], nodes with an open left/right slot
//! - **Search**: [`search`], case-insensitive match on name or id with the
//!   root-to-node path of every match
//! - **Expansion**: [`ExpansionState`], per-node expanded flags under full,
//!   depth-limited or custom view modes
//!
//! Trees are immutable once built. [`SnapshotStore`] publishes each rebuild as
//! a new `Arc` snapshot so readers on other threads never see a partial tree.
//!
//! ## Example
//!
//! ```
//! use referral_tree::{build_tree, ExpansionState, FlatMap, Position, ViewConfig};
//!
//! let map = FlatMap::from_json(
//!     r#"{"A": {"name": "Alice", "leftChild": "B", "referralId": null},
//!         "B": {"name": "Bob", "referralId": "A"}}"#,
//! )
//! .unwrap();
//!
//! let outcome = build_tree(&map);
//! assert!(!outcome.root_selection_ambiguous);
//! let tree = outcome.tree.unwrap();
//!
//! assert_eq!(tree.max_depth(), 2);
//! assert_eq!(tree.empty_slots()[0].available_positions, vec![Position::Right]);
//!
//! let mut view = ExpansionState::initial(&tree, &ViewConfig::default());
//! let matches = tree.search("bob");
//! view.reveal_search(&tree, &matches).unwrap();
//! assert!(view.is_expanded("B"));
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
mod error;
mod expansion;
mod hash;
mod node;
mod record;
mod search;
mod slots;
mod snapshot;
mod tree;

pub use config::ViewConfig;
pub use error::{Result, TreeError};
pub use expansion::{ExpansionState, ViewMode};
pub use hash::{Blake3Hasher, Fingerprint, Hasher, Sha256Hasher};
pub use node::{NodeId, Position, TreeNode};
pub use record::{FlatMap, UserRecord};
pub use search::{search, SearchPath};
pub use slots::{find_empty_slots, sort_slots, EmptySlot, SlotOrder};
pub use snapshot::{PublishReport, SnapshotStore, TreeSnapshot};
pub use tree::{build_tree, max_depth, BuildOutcome, Diagnostic, PreOrder, ReferralTree, Suggestion};

// Only the simulate binary uses these
#[cfg(feature = "simulation")]
use {rand as _, tracing_subscriber as _};
