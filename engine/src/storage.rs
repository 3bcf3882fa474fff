//! Typed storage items on top of [`Externalities`].
//!
//! Keys are namespaced with `twox_128`: a value lives at
//! `twox_128(prefix)`, a map entry at `twox_128(prefix ++ encode(key))`.
//! Well-known keys that other tools read directly go through
//! [`unhashed`].
//!
//! A stored value that fails to decode is logged and read as absent.

use core::marker::PhantomData;
use strata_primitives::{decode_all, Decode, Encode};
use alloc::vec::Vec;
use crate::host::Externalities;

fn read<T: Decode>(ext: &dyn Externalities, key: &[u8]) -> Option<T> {
    let raw = ext.storage(key)?;
    match decode_all(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::error!(
                target: "runtime::storage",
                "corrupted value under key {:?}: {}",
                key,
                err,
            );
            None
        }
    }
}

/// A single value under a fixed prefix.
pub struct StorageValue<T> {
    prefix: &'static [u8],
    _marker: PhantomData<fn() -> T>,
}

impl<T> StorageValue<T> {
    pub const fn new(prefix: &'static [u8]) -> Self {
        Self { prefix, _marker: PhantomData }
    }

    pub fn key(&self, ext: &dyn Externalities) -> [u8; 16] {
        ext.twox_128(self.prefix)
    }

    pub fn exists(&self, ext: &dyn Externalities) -> bool {
        ext.exists_storage(&self.key(ext))
    }

    pub fn kill(&self, ext: &mut dyn Externalities) {
        let key = self.key(ext);
        ext.clear_storage(&key);
    }
}

impl<T: Encode + Decode> StorageValue<T> {
    pub fn get(&self, ext: &dyn Externalities) -> Option<T> {
        read(ext, &self.key(ext))
    }

    pub fn put(&self, ext: &mut dyn Externalities, value: &T) {
        let key = self.key(ext);
        ext.set_storage(&key, &value.encode());
    }

    /// Read and remove in one step.
    pub fn take(&self, ext: &mut dyn Externalities) -> Option<T> {
        let value = self.get(ext);
        self.kill(ext);
        value
    }

    /// Update the value in place, starting from the default when absent.
    pub fn mutate<R, F>(&self, ext: &mut dyn Externalities, f: F) -> R
    where
        T: Default,
        F: FnOnce(&mut T) -> R,
    {
        let mut value = self.get(ext).unwrap_or_default();
        let result = f(&mut value);
        self.put(ext, &value);
        result
    }
}

/// A map from encoded keys to values under a fixed prefix.
pub struct StorageMap<K, V> {
    prefix: &'static [u8],
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K: Encode, V> StorageMap<K, V> {
    pub const fn new(prefix: &'static [u8]) -> Self {
        Self { prefix, _marker: PhantomData }
    }

    pub fn key(&self, ext: &dyn Externalities, key: &K) -> [u8; 16] {
        let mut raw = Vec::with_capacity(self.prefix.len() + 32);
        raw.extend_from_slice(self.prefix);
        key.encode_to(&mut raw);
        ext.twox_128(&raw)
    }

    pub fn contains_key(&self, ext: &dyn Externalities, key: &K) -> bool {
        ext.exists_storage(&self.key(ext, key))
    }

    pub fn remove(&self, ext: &mut dyn Externalities, key: &K) {
        let hashed = self.key(ext, key);
        ext.clear_storage(&hashed);
    }
}

impl<K: Encode, V: Encode + Decode> StorageMap<K, V> {
    pub fn get(&self, ext: &dyn Externalities, key: &K) -> Option<V> {
        read(ext, &self.key(ext, key))
    }

    pub fn insert(&self, ext: &mut dyn Externalities, key: &K, value: &V) {
        let hashed = self.key(ext, key);
        ext.set_storage(&hashed, &value.encode());
    }

    pub fn take(&self, ext: &mut dyn Externalities, key: &K) -> Option<V> {
        let value = self.get(ext, key);
        self.remove(ext, key);
        value
    }

    pub fn mutate<R, F>(&self, ext: &mut dyn Externalities, key: &K, f: F) -> R
    where
        V: Default,
        F: FnOnce(&mut V) -> R,
    {
        let mut value = self.get(ext, key).unwrap_or_default();
        let result = f(&mut value);
        self.insert(ext, key, &value);
        result
    }
}

/// Raw keys, stored without hashing.
pub mod unhashed {
    use super::*;

    pub fn get<T: Decode>(ext: &dyn Externalities, key: &[u8]) -> Option<T> {
        read(ext, key)
    }

    pub fn put<T: Encode>(ext: &mut dyn Externalities, key: &[u8], value: &T) {
        ext.set_storage(key, &value.encode());
    }

    pub fn kill(ext: &mut dyn Externalities, key: &[u8]) {
        ext.clear_storage(key);
    }

    pub fn take<T: Decode>(ext: &mut dyn Externalities, key: &[u8]) -> Option<T> {
        let value = get(ext, key);
        kill(ext, key);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TestExternalities;
    use strata_primitives::crypto::twox_128;

    const COUNTER: StorageValue<u64> = StorageValue::new(b"Test Counter");
    const BALANCES: StorageMap<[u8; 32], u64> = StorageMap::new(b"Test Balances");

    #[test]
    fn test_value_key_is_hashed_prefix() {
        let ext = TestExternalities::default();
        assert_eq!(COUNTER.key(&ext), twox_128(b"Test Counter"));
    }

    #[test]
    fn test_map_key_includes_encoded_key() {
        let ext = TestExternalities::default();
        let mut raw = b"Test Balances".to_vec();
        raw.extend_from_slice(&[1u8; 32]);
        assert_eq!(BALANCES.key(&ext, &[1u8; 32]), twox_128(&raw));
        assert_ne!(BALANCES.key(&ext, &[1u8; 32]), BALANCES.key(&ext, &[2u8; 32]));
    }

    #[test]
    fn test_value_put_take_kill() {
        let mut ext = TestExternalities::default();
        assert_eq!(COUNTER.get(&ext), None);

        COUNTER.put(&mut ext, &5);
        assert!(COUNTER.exists(&ext));
        assert_eq!(COUNTER.take(&mut ext), Some(5));
        assert!(!COUNTER.exists(&ext));

        COUNTER.put(&mut ext, &6);
        COUNTER.kill(&mut ext);
        assert_eq!(COUNTER.get(&ext), None);
    }

    #[test]
    fn test_mutate_starts_from_default() {
        let mut ext = TestExternalities::default();
        let after = COUNTER.mutate(&mut ext, |c| {
            *c += 3;
            *c
        });
        assert_eq!(after, 3);
        BALANCES.mutate(&mut ext, &[1u8; 32], |b| *b += 10);
        assert_eq!(BALANCES.get(&ext, &[1u8; 32]), Some(10));
    }

    #[test]
    fn test_map_take_removes() {
        let mut ext = TestExternalities::default();
        BALANCES.insert(&mut ext, &[7u8; 32], &70);
        assert!(BALANCES.contains_key(&ext, &[7u8; 32]));
        assert_eq!(BALANCES.take(&mut ext, &[7u8; 32]), Some(70));
        assert!(!BALANCES.contains_key(&ext, &[7u8; 32]));
    }

    #[test]
    fn test_corrupted_value_reads_as_absent() {
        let mut ext = TestExternalities::default();
        let key = COUNTER.key(&ext);
        ext.set_storage(&key, &[1, 2, 3]);
        assert_eq!(COUNTER.get(&ext), None);
    }

    #[test]
    fn test_unhashed_roundtrip() {
        let mut ext = TestExternalities::default();
        unhashed::put(&mut ext, b":raw", &9u32);
        assert_eq!(ext.storage(b":raw"), Some(9u32.to_le_bytes().to_vec()));
        assert_eq!(unhashed::take::<u32>(&mut ext, b":raw"), Some(9));
        assert_eq!(unhashed::get::<u32>(&ext, b":raw"), None);
    }
}
