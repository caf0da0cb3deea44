//! Empty-slot discovery.
//!
//! Every node has exactly two slots. A slot with no occupant is where the next
//! referral under that parent would be placed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{Position, ReferralTree};

/// A node with at least one unfilled slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmptySlot {
    pub parent_id: String,
    pub parent_name: String,
    /// Level a new child would land on: depth(parent) + 1
    pub level: usize,
    /// Unfilled slots, left first
    pub available_positions: Vec<Position>,
}

/// Presentation order for empty slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotOrder {
    /// Shallowest first
    #[default]
    Level,
    /// Parent display name, lexicographic
    ParentName,
}

impl ReferralTree {
    /// Nodes with fewer than two children, in pre-order.
    pub fn empty_slots(&self) -> Vec<EmptySlot> {
        self.preorder()
            .filter_map(|id| {
                let node = self.node(id);
                let available_positions = node.open_positions();
                if available_positions.is_empty() {
                    return None;
                }
                Some(EmptySlot {
                    parent_id: node.user_id.clone(),
                    parent_name: node.name.clone(),
                    level: node.depth + 1,
                    available_positions,
                })
            })
            .collect()
    }
}

/// Empty slots of an optional tree; nothing when there is no tree.
pub fn find_empty_slots(tree: Option<&ReferralTree>) -> Vec<EmptySlot> {
    tree.map(ReferralTree::empty_slots).unwrap_or_default()
}

/// Stable re-sort of finder output for display.
pub fn sort_slots(slots: &mut [EmptySlot], order: SlotOrder) {
    let compare: fn(&EmptySlot, &EmptySlot) -> Ordering = match order {
        SlotOrder::Level => |a, b| a.level.cmp(&b.level),
        SlotOrder::ParentName => |a, b| a.parent_name.cmp(&b.parent_name),
    };
    slots.sort_by(compare);
}
