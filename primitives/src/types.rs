//! Core type aliases and constants for the Strata runtime.
//!
//! The widths here are fixed for this chain: 32-byte blake2 hashes,
//! ed25519 public keys as account identifiers, and `u64` block numbers
//! and nonces.

use alloc::string::String;

/// 32-byte blake2-256 output used for block hashes and trie roots.
pub type Hash = [u8; 32];

/// Account identifier: an ed25519 public key.
pub type AccountId = [u8; 32];

/// Authority identifier carried in `AuthoritiesChange` digest items.
pub type AuthorityId = [u8; 32];

/// Raw ed25519 signature.
pub type Signature = [u8; 64];

/// Block height (monotonically increasing).
pub type BlockNumber = u64;

/// Per-account transaction sequence number.
pub type Index = u64;

/// Short account reference resolved through the indices module.
pub type AccountIndex = u32;

/// A zero-valued hash (32 zero bytes).
pub const ZERO_HASH: Hash = [0u8; 32];

/// Convert a `Hash` to a hex string for display purposes.
pub fn hash_to_hex(hash: &Hash) -> String {
    let mut s = String::with_capacity(66);
    s.push_str("0x");
    for byte in hash {
        use core::fmt::Write;
        let _ = write!(s, "{:02x}", byte);
    }
    s
}
