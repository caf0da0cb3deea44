//! View configuration.

use serde::{Deserialize, Serialize};

use crate::{error::Result, SlotOrder};

/// Defaults applied when a tree is first shown.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    /// Nodes with depth below this start expanded (2 = root row open)
    pub initial_expand_depth: usize,
    /// Cap on autocomplete entries; `None` returns every node
    pub suggestion_limit: Option<usize>,
    /// Order of the empty-slot list
    pub slot_order: SlotOrder,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_expand_depth: 2,
            suggestion_limit: None,
            slot_order: SlotOrder::Level,
        }
    }
}

impl ViewConfig {
    /// Decode a config, filling unspecified fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
