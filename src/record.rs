//! Flat-map input records.
//!
//! The backend ships the referral graph as a JSON object keyed by user id,
//! where each record names its children by id:
//!
//! ```json
//! {
//!   "A": { "name": "Alice", "leftChild": "B", "referralId": null, "amountPlayed": 120 },
//!   "B": { "name": "Bob", "referralId": "A" }
//! }
//! ```
//!
//! Key order is preserved and is the iteration order used by every tie-break
//! in [`crate::build_tree`].

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{error::Result, TreeError};

/// One user as delivered by the backend.
///
/// Any field not named here (amounts played, bonuses, ...) is kept verbatim in
/// `payload` and copied onto the built node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "WireRecord")]
pub struct UserRecord {
    /// Display name
    pub name: String,
    /// Optional echo of the map key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Occupant of the left slot
    pub left_child: Option<String>,
    /// Occupant of the right slot
    pub right_child: Option<String>,
    /// Referring parent; absent only for the root
    pub referral_id: Option<String>,
    /// Opaque business fields
    #[serde(flatten)]
    pub payload: BTreeMap<String, Value>,
}

/// Record as it appears on the wire, before the parent fields are merged.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    #[serde(default, deserialize_with = "deserialize_lenient_name")]
    name: String,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    left_child: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    right_child: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    referral_id: Option<String>,
    /// Older endpoints; only consulted when `referralId` is absent
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    parent_id: Option<String>,
    #[serde(flatten)]
    payload: BTreeMap<String, Value>,
}

impl From<WireRecord> for UserRecord {
    fn from(wire: WireRecord) -> Self {
        Self {
            name: wire.name,
            user_id: wire.user_id,
            left_child: wire.left_child,
            right_child: wire.right_child,
            referral_id: wire.referral_id.or(wire.parent_id),
            payload: wire.payload,
        }
    }
}

impl UserRecord {
    /// Create a record with a display name and no links.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the left child id.
    pub fn with_left(mut self, id: impl Into<String>) -> Self {
        self.left_child = Some(id.into());
        self
    }

    /// Set the right child id.
    pub fn with_right(mut self, id: impl Into<String>) -> Self {
        self.right_child = Some(id.into());
        self
    }

    /// Set the referring parent id.
    pub fn with_referral(mut self, id: impl Into<String>) -> Self {
        self.referral_id = Some(id.into());
        self
    }

    /// Attach an opaque payload field.
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// True if the record names no referring parent.
    pub fn is_parentless(&self) -> bool {
        self.referral_id.is_none()
    }
}

/// Ids arrive as strings, numbers or null depending on the endpoint.
fn deserialize_optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Names arrive as strings, sometimes null or numeric; anything else is blank.
fn deserialize_lenient_name<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// User id -> record, in wire order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatMap {
    records: IndexMap<String, UserRecord>,
}

impl FlatMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and validate a flat map from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: Self = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Decode and validate a flat map from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let map: Self = serde_json::from_slice(bytes)?;
        map.validate()?;
        Ok(map)
    }

    /// Reject records that cannot be addressed consistently.
    ///
    /// Dangling links are not checked here; the builder tolerates them.
    pub fn validate(&self) -> Result<()> {
        for (key, record) in &self.records {
            if key.trim().is_empty() {
                return Err(TreeError::InvalidRecord {
                    user_id: key.clone(),
                    reason: "empty user id".to_string(),
                });
            }
            if let Some(echo) = &record.user_id {
                if echo != key {
                    return Err(TreeError::InvalidRecord {
                        user_id: key.clone(),
                        reason: format!("userId field {echo:?} does not match map key"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Insert or replace a record, returning the previous one.
    ///
    /// Replacing keeps the key's original position.
    pub fn insert(&mut self, user_id: impl Into<String>, record: UserRecord) -> Option<UserRecord> {
        self.records.insert(user_id.into(), record)
    }

    /// Remove a record, preserving the order of the rest.
    pub fn remove(&mut self, user_id: &str) -> Option<UserRecord> {
        self.records.shift_remove(user_id)
    }

    pub fn get(&self, user_id: &str) -> Option<&UserRecord> {
        self.records.get(user_id)
    }

    pub fn get_mut(&mut self, user_id: &str) -> Option<&mut UserRecord> {
        self.records.get_mut(user_id)
    }

    /// Position of a key in iteration order.
    pub fn index_of(&self, user_id: &str) -> Option<usize> {
        self.records.get_index_of(user_id)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.records.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over `(user_id, record)` in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserRecord)> + '_ {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }
}

impl<K: Into<String>> FromIterator<(K, UserRecord)> for FlatMap {
    fn from_iter<I: IntoIterator<Item = (K, UserRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
