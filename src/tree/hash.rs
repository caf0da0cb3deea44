//! Structural and content fingerprinting for built trees.

use crate::{Blake3Hasher, Fingerprint, Hasher, Position, TreeNode};

use super::ReferralTree;

impl ReferralTree {
    /// Fingerprint of the tree shape with the default hasher.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint_with(&Blake3Hasher)
    }

    /// Fingerprint of the tree shape.
    ///
    /// Covers user ids and which slot each child occupies; names and payload
    /// are ignored. Two builds with the same parent/child/position relations
    /// produce the same fingerprint regardless of arena order.
    pub fn fingerprint_with<H: Hasher>(&self, hasher: &H) -> Fingerprint {
        self.fold_fingerprints(|node, left, right| hasher.hash_node(&node.user_id, left, right))
    }

    /// Fingerprint of shape plus every name and payload, default hasher.
    pub fn content_fingerprint(&self) -> Fingerprint {
        self.content_fingerprint_with(&Blake3Hasher)
    }

    /// Like [`fingerprint_with`](Self::fingerprint_with), but a rename or a
    /// payload edit anywhere changes the result.
    pub fn content_fingerprint_with<H: Hasher>(&self, hasher: &H) -> Fingerprint {
        self.fold_fingerprints(|node, left, right| {
            let shape = hasher.hash_node(&node.user_id, left, right);
            hasher.hash_content(&shape, &node_content(node))
        })
    }

    /// Bottom-up fold over every subtree, returning the root's digest.
    fn fold_fingerprints<F>(&self, node_hash: F) -> Fingerprint
    where
        F: Fn(&TreeNode, &Fingerprint, &Fingerprint) -> Fingerprint,
    {
        let order: Vec<_> = self.preorder().collect();
        let mut hashes = vec![Fingerprint::ZERO; self.len()];

        // Reverse pre-order visits children before their parent
        for id in order.into_iter().rev() {
            let node = self.node(id);
            let child_hash = |position| {
                node.child(position)
                    .map_or(Fingerprint::ZERO, |child| hashes[child.index()])
            };
            let left = child_hash(Position::Left);
            let right = child_hash(Position::Right);
            hashes[id.index()] = node_hash(node, &left, &right);
        }

        hashes[self.root().index()]
    }
}

/// Length-prefixed name followed by each payload entry in key order.
fn node_content(node: &TreeNode) -> Vec<u8> {
    let mut out = Vec::new();
    let mut push = |bytes: &[u8]| {
        out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        out.extend_from_slice(bytes);
    };
    push(node.name.as_bytes());
    for (key, value) in &node.payload {
        push(key.as_bytes());
        push(value.to_string().as_bytes());
    }
    out
}
