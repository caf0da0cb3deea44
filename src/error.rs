//! Error types for the referral tree crate.
//!
//! Building and querying a tree never fails on malformed-but-plausible input;
//! those cases surface as [`crate::Diagnostic`]s instead. Errors are reserved
//! for input that cannot be decoded at all and for lookups of ids the caller
//! named explicitly.

use thiserror::Error;

/// Errors that can occur while decoding input or addressing nodes.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Flat map could not be decoded from JSON
    #[error("invalid flat map JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A record decoded but its shape is unusable
    #[error("invalid record for user {user_id}: {reason}")]
    InvalidRecord { user_id: String, reason: String },

    /// Node id is not part of the current tree
    #[error("node not found: {0}")]
    UnknownNode(String),
}

/// Result type alias for referral tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
