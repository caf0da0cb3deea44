//! Hash function abstraction for structural fingerprints.
//!
//! A fingerprint summarises the shape of a built tree (which user sits in
//! which slot under which parent) so two builds can be compared without
//! walking both trees. Payload fields and display names are not covered.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// 32-byte structural digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Digest of an absent subtree.
    pub const ZERO: Fingerprint = Fingerprint([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(&self.0[..8]))
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

/// Trait for hash functions used to fingerprint trees.
///
/// Absent subtrees hash to [`Fingerprint::ZERO`]; a present node never does,
/// so a missing left child and a present one are always distinguishable.
pub trait Hasher: Clone + Default + Send + Sync {
    /// Raw hash of arbitrary input
    fn hash_raw(&self, input: &[u8]) -> Fingerprint;

    /// Hash of a node: `hash(0x01 || len(id) || id || left || right)`
    fn hash_node(&self, user_id: &str, left: &Fingerprint, right: &Fingerprint) -> Fingerprint {
        let id = user_id.as_bytes();
        let mut input = Vec::with_capacity(1 + 8 + id.len() + 64);
        input.push(0x01);
        input.extend_from_slice(&(id.len() as u64).to_be_bytes());
        input.extend_from_slice(id);
        input.extend_from_slice(left.as_bytes());
        input.extend_from_slice(right.as_bytes());
        self.hash_raw(&input)
    }

    /// Hash of a node's shape digest with its serialized content:
    /// `hash(0x02 || shape || content)`
    fn hash_content(&self, shape: &Fingerprint, content: &[u8]) -> Fingerprint {
        let mut input = Vec::with_capacity(1 + 32 + content.len());
        input.push(0x02);
        input.extend_from_slice(shape.as_bytes());
        input.extend_from_slice(content);
        self.hash_raw(&input)
    }
}

/// SHA256-based hasher.
#[derive(Clone, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash_raw(&self, input: &[u8]) -> Fingerprint {
        Fingerprint(Sha256::digest(input).into())
    }
}

/// BLAKE3-based hasher (default).
#[derive(Clone, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn hash_raw(&self, input: &[u8]) -> Fingerprint {
        Fingerprint(*blake3::hash(input).as_bytes())
    }
}
