//! `strata-primitives`: foundational types for the Strata runtime.
//!
//! This crate provides the canonical codec, hashing and signature helpers,
//! trie roots, the storage overlay, block and header types, the extrinsic
//! model and the result types exchanged with block builders and the
//! transaction pool.
//!
//! Supports `#![no_std]` for embedding in a restricted runtime (use
//! `default-features = false`).

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod types;
pub mod error;
pub mod codec;
pub mod crypto;
pub mod trie;
pub mod state;
pub mod block;
pub mod extrinsic;
pub mod apply;
pub mod transaction_validity;
pub mod inherents;
pub mod version;

// Re-export commonly used types at the crate root for convenience.
pub use types::{AccountId, AccountIndex, AuthorityId, BlockNumber, Hash, Index, Signature, ZERO_HASH};
pub use error::{CheckError, CodecError, DispatchError, InherentError};
pub use codec::{decode_all, Compact, Decode, Encode, Reader};
pub use trie::{enumerated_trie_root, MerkleTree};
pub use state::StateOverlay;
pub use block::{Block, Digest, DigestItem, Header};
pub use extrinsic::{
    Address, Applyable, CheckContext, Checkable, CheckedExtrinsic, Extrinsic, UncheckedExtrinsic,
};
pub use apply::{ApplyError, ApplyOutcome, ApplyResult};
pub use transaction_validity::{TransactionTag, TransactionValidity};
pub use inherents::{CheckInherentsResult, InherentData, InherentIdentifier};
pub use version::RuntimeVersion;
