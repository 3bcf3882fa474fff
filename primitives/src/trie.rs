//! Merkle roots over key-value sets and ordered value lists.
//!
//! Two roots are committed to in every header:
//! - the state root, a [`MerkleTree`] over all storage entries
//! - the extrinsics root, an [`enumerated_trie_root`] over the encoded
//!   extrinsics in block order
//!
//! Entries are sorted by key and hashed pairwise into a binary tree. Leaf
//! and internal nodes use different domain prefixes.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use crate::codec::{Compact, Encode};
use crate::crypto::blake2_256;
use crate::types::{Hash, ZERO_HASH};

const LEAF_PREFIX: u8 = 0x00;
const INTERNAL_PREFIX: u8 = 0x01;

/// Key-value set with a deterministic Merkle root.
///
/// `BTreeMap` keeps entries sorted, so the root does not depend on
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerkleTree {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MerkleTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a key-value pair.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) {
        self.entries.insert(key.to_vec(), value.to_vec());
    }

    pub fn remove(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries.get(key).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compute the Merkle root.
    ///
    /// Empty tree returns `ZERO_HASH`; a single entry returns its leaf hash.
    pub fn root(&self) -> Hash {
        let leaves: Vec<Hash> = self
            .entries
            .iter()
            .map(|(k, v)| hash_leaf(k, v))
            .collect();
        compute_root_from_leaves(&leaves)
    }

    /// Apply a batch of overlay writes: `Some(value)` sets, `None` removes.
    pub fn apply_writes(&mut self, writes: &BTreeMap<Vec<u8>, Option<Vec<u8>>>) {
        for (key, value) in writes {
            match value {
                Some(v) => {
                    self.entries.insert(key.clone(), v.clone());
                }
                None => {
                    self.entries.remove(key);
                }
            }
        }
    }
}

impl FromIterator<(Vec<u8>, Vec<u8>)> for MerkleTree {
    fn from_iter<I: IntoIterator<Item = (Vec<u8>, Vec<u8>)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// Root of an ordered list of values.
///
/// Each value is keyed by the compact encoding of its position, so the
/// root commits to order as well as content.
pub fn enumerated_trie_root<I, V>(values: I) -> Hash
where
    I: IntoIterator<Item = V>,
    V: AsRef<[u8]>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (Compact(i as u32).encode(), v.as_ref().to_vec()))
        .collect::<MerkleTree>()
        .root()
}

/// H(LEAF_PREFIX || key_len_le32 || key || value)
fn hash_leaf(key: &[u8], value: &[u8]) -> Hash {
    let key_len = (key.len() as u32).to_le_bytes();
    let mut data = Vec::with_capacity(1 + 4 + key.len() + value.len());
    data.push(LEAF_PREFIX);
    data.extend_from_slice(&key_len);
    data.extend_from_slice(key);
    data.extend_from_slice(value);
    blake2_256(&data)
}

/// H(INTERNAL_PREFIX || left || right)
fn hash_internal(left: &Hash, right: &Hash) -> Hash {
    let mut data = [0u8; 1 + 32 + 32];
    data[0] = INTERNAL_PREFIX;
    data[1..33].copy_from_slice(left);
    data[33..65].copy_from_slice(right);
    blake2_256(&data)
}

/// Pair hashes level by level; an odd trailing node is promoted as is.
fn compute_root_from_leaves(leaves: &[Hash]) -> Hash {
    match leaves {
        [] => ZERO_HASH,
        [single] => *single,
        _ => {
            let mut level: Vec<Hash> = leaves.to_vec();
            while level.len() > 1 {
                level = level
                    .chunks(2)
                    .map(|pair| match pair {
                        [left, right] => hash_internal(left, right),
                        [odd] => *odd,
                        _ => unreachable!("chunks(2) yields one or two items"),
                    })
                    .collect();
            }
            level[0]
        }
    }
}
