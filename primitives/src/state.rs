//! Pending storage changes of the block in progress.
//!
//! Reads through a host first consult the overlay, then committed state.
//! Accepting a block folds the overlay into committed state; a failed
//! import discards it.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Key-ordered change set. `None` marks a cleared key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateOverlay {
    changes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl StateOverlay {
    /// Record a write; `None` clears the key.
    pub fn set_storage(&mut self, key: &[u8], value: Option<&[u8]>) {
        self.changes.insert(key.to_vec(), value.map(<[u8]>::to_vec));
    }

    /// `None` if the key is untouched, `Some(None)` if it was cleared.
    pub fn storage(&self, key: &[u8]) -> Option<Option<&[u8]>> {
        self.changes.get(key).map(Option::as_deref)
    }

    pub fn changes(&self) -> &BTreeMap<Vec<u8>, Option<Vec<u8>>> {
        &self.changes
    }

    /// Apply every change to `committed` and empty the overlay.
    pub fn commit_into(&mut self, committed: &mut BTreeMap<Vec<u8>, Vec<u8>>) {
        for (key, value) in core::mem::take(&mut self.changes) {
            match value {
                Some(value) => committed.insert(key, value),
                None => committed.remove(&key),
            };
        }
    }

    /// Keys whose pending value differs from `committed`.
    ///
    /// Writing a value back to what it was, or clearing a key that never
    /// existed, does not count.
    pub fn changed_keys<'a>(
        &'a self,
        committed: &'a BTreeMap<Vec<u8>, Vec<u8>>,
    ) -> impl Iterator<Item = (&'a [u8], Option<&'a [u8]>)> + 'a {
        self.changes.iter().filter_map(move |(key, value)| {
            let before = committed.get(key).map(Vec::as_slice);
            let after = value.as_deref();
            (before != after).then_some((key.as_slice(), after))
        })
    }

    pub fn discard(&mut self) {
        self.changes.clear();
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_untouched_set_and_cleared() {
        let mut overlay = StateOverlay::default();
        assert_eq!(overlay.storage(b":extrinsic_index"), None);

        overlay.set_storage(b":extrinsic_index", Some(&[0, 0, 0, 0]));
        assert_eq!(overlay.storage(b":extrinsic_index"), Some(Some([0u8, 0, 0, 0].as_slice())));

        overlay.set_storage(b":extrinsic_index", None);
        assert_eq!(overlay.storage(b":extrinsic_index"), Some(None));
        assert_eq!(overlay.len(), 1);
    }

    #[test]
    fn test_commit_applies_sets_and_clears() {
        let mut committed = BTreeMap::new();
        committed.insert(b"number".to_vec(), vec![7]);
        committed.insert(b"seed".to_vec(), vec![9]);

        let mut overlay = StateOverlay::default();
        overlay.set_storage(b"number", Some(&[8]));
        overlay.set_storage(b"seed", None);
        overlay.set_storage(b"nonce", Some(&[1]));
        overlay.commit_into(&mut committed);

        assert!(overlay.is_empty());
        assert_eq!(committed.get(b"number".as_slice()), Some(&vec![8]));
        assert_eq!(committed.get(b"nonce".as_slice()), Some(&vec![1]));
        assert!(!committed.contains_key(b"seed".as_slice()));
    }

    #[test]
    fn test_transient_key_is_not_a_change() {
        let mut committed = BTreeMap::new();
        committed.insert(b"balance".to_vec(), vec![5]);

        let mut overlay = StateOverlay::default();
        overlay.set_storage(b"balance", Some(&[5]));
        overlay.set_storage(b"extrinsic_data", Some(&[1, 2]));
        overlay.set_storage(b"extrinsic_data", None);
        overlay.set_storage(b"events", Some(&[0]));

        let changed: Vec<_> = overlay.changed_keys(&committed).collect();
        assert_eq!(changed, vec![(b"events".as_slice(), Some([0u8].as_slice()))]);
    }

    #[test]
    fn test_discard() {
        let mut overlay = StateOverlay::default();
        overlay.set_storage(b"a", Some(b"1"));
        overlay.discard();
        assert!(overlay.is_empty());
        assert_eq!(overlay.storage(b"a"), None);
    }
}
