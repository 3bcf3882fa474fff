//! Host interface: the only way runtime code touches the outside world.
//!
//! The `Externalities` trait decouples the engine from the environment
//! that executes it. Every component receives an explicit
//! `&mut dyn Externalities` handle whose lifetime is one block (or one
//! validation call).
//!
//! - In tests and native execution: [`TestExternalities`], an in-memory
//!   store with a commit/discard overlay
//! - For transaction validation: [`OverlayedExternalities`], a throwaway
//!   write buffer over a read-only view of another handle

use strata_primitives::{
    crypto, trie, BlockNumber, Compact, Encode, Hash, MerkleTree, Signature, StateOverlay,
};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

/// Host services available to the runtime.
///
/// Storage is byte-keyed and last-write-wins. No transactions are exposed
/// at this layer; isolation is the caller's business.
pub trait Externalities {
    /// Read a value. Reads reflect every earlier write through this handle.
    fn storage(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn set_storage(&mut self, key: &[u8], value: &[u8]);

    fn clear_storage(&mut self, key: &[u8]);

    /// Merkle root of the current state, including pending writes.
    fn storage_root(&self) -> Hash;

    /// Root of the changes trie for the block following `parent_number`,
    /// or `None` if this backend does not build changes tries.
    fn storage_changes_root(&self, parent_hash: &Hash, parent_number: BlockNumber) -> Option<Hash>;

    /// Debug output. Not consensus-critical; the host may drop it.
    fn print(&mut self, message: &str);

    fn exists_storage(&self, key: &[u8]) -> bool {
        self.storage(key).is_some()
    }

    fn blake2_256(&self, data: &[u8]) -> Hash {
        crypto::blake2_256(data)
    }

    fn twox_128(&self, data: &[u8]) -> [u8; 16] {
        crypto::twox_128(data)
    }

    fn verify_ed25519(&self, message: &[u8], signature: &Signature, public_key: &[u8; 32]) -> bool {
        crypto::verify_ed25519(message, signature, public_key)
    }

    /// Order-sensitive root over a list of byte strings.
    fn enumerated_trie_root(&self, values: &[Vec<u8>]) -> Hash {
        trie::enumerated_trie_root(values)
    }
}

// ── TestExternalities: in-memory host ──

/// In-memory externalities.
///
/// Uses a `BTreeMap` as committed state and a `StateOverlay` for the
/// writes of the block in progress. `commit` accepts the block, `discard`
/// throws it away.
#[derive(Debug, Clone, Default)]
pub struct TestExternalities {
    committed: BTreeMap<Vec<u8>, Vec<u8>>,
    overlay: StateOverlay,
    changes_trie: bool,
    logs: Vec<String>,
}

impl TestExternalities {
    pub fn new(committed: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Self { committed, ..Self::default() }
    }

    /// Enable or disable changes-trie roots.
    pub fn with_changes_trie(mut self, enabled: bool) -> Self {
        self.changes_trie = enabled;
        self
    }

    /// Drain the overlay into committed state.
    pub fn commit(&mut self) {
        self.overlay.commit_into(&mut self.committed);
    }

    /// Drop every write made since the last commit.
    pub fn discard(&mut self) {
        self.overlay.discard();
    }

    pub fn committed_state(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.committed
    }

    pub fn overlay(&self) -> &StateOverlay {
        &self.overlay
    }

    /// Collected `print` output.
    pub fn logs(&self) -> &[String] {
        &self.logs
    }
}

impl Externalities for TestExternalities {
    fn storage(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.overlay.storage(key) {
            Some(pending) => pending.map(<[u8]>::to_vec),
            None => self.committed.get(key).cloned(),
        }
    }

    fn set_storage(&mut self, key: &[u8], value: &[u8]) {
        self.overlay.set_storage(key, Some(value));
    }

    fn clear_storage(&mut self, key: &[u8]) {
        self.overlay.set_storage(key, None);
    }

    fn storage_root(&self) -> Hash {
        let mut tree: MerkleTree = self
            .committed
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        tree.apply_writes(self.overlay.changes());
        tree.root()
    }

    fn storage_changes_root(&self, parent_hash: &Hash, parent_number: BlockNumber) -> Option<Hash> {
        if !self.changes_trie {
            return None;
        }
        let block = Compact(parent_number.saturating_add(1)).encode();
        let mut tree: MerkleTree = self
            .overlay
            .changed_keys(&self.committed)
            .map(|(key, _)| (key.to_vec(), block.clone()))
            .collect();
        // Roots are fork-specific.
        tree.insert(b":parent_hash", parent_hash);
        Some(tree.root())
    }

    fn print(&mut self, message: &str) {
        log::debug!(target: "runtime::print", "{}", message);
        self.logs.push(String::from(message));
    }
}

// ── OverlayedExternalities: throwaway view ──

/// Write buffer over a read-only handle. Dropping it discards every write.
///
/// Roots are delegated to the underlying handle and do not reflect the
/// buffered writes; validation never reads them.
pub struct OverlayedExternalities<'a> {
    inner: &'a dyn Externalities,
    overlay: StateOverlay,
}

impl<'a> OverlayedExternalities<'a> {
    pub fn new(inner: &'a dyn Externalities) -> Self {
        Self { inner, overlay: StateOverlay::default() }
    }

    /// Writes buffered so far.
    pub fn overlay(&self) -> &StateOverlay {
        &self.overlay
    }
}

impl Externalities for OverlayedExternalities<'_> {
    fn storage(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.overlay.storage(key) {
            Some(pending) => pending.map(<[u8]>::to_vec),
            None => self.inner.storage(key),
        }
    }

    fn set_storage(&mut self, key: &[u8], value: &[u8]) {
        self.overlay.set_storage(key, Some(value));
    }

    fn clear_storage(&mut self, key: &[u8]) {
        self.overlay.set_storage(key, None);
    }

    fn storage_root(&self) -> Hash {
        self.inner.storage_root()
    }

    fn storage_changes_root(&self, parent_hash: &Hash, parent_number: BlockNumber) -> Option<Hash> {
        self.inner.storage_changes_root(parent_hash, parent_number)
    }

    fn print(&mut self, message: &str) {
        log::debug!(target: "runtime::print", "{}", message);
    }

    fn blake2_256(&self, data: &[u8]) -> Hash {
        self.inner.blake2_256(data)
    }

    fn twox_128(&self, data: &[u8]) -> [u8; 16] {
        self.inner.twox_128(data)
    }

    fn verify_ed25519(&self, message: &[u8], signature: &Signature, public_key: &[u8; 32]) -> bool {
        self.inner.verify_ed25519(message, signature, public_key)
    }

    fn enumerated_trie_root(&self, values: &[Vec<u8>]) -> Hash {
        self.inner.enumerated_trie_root(values)
    }
}
