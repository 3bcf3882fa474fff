//! `strata-engine`: block execution for Strata runtimes.
//!
//! This crate implements the state transition at the heart of a runtime:
//! import a block (checking everything its header claims), author a block
//! one extrinsic at a time, and judge transactions for the pool.
//!
//! ## Architecture
//!
//! - [`host::Externalities`]: storage and crypto services supplied by the host
//! - [`host::TestExternalities`]: in-memory host with a commit/discard overlay
//! - [`storage`]: typed values and maps over raw storage
//! - [`system::System`]: block metadata, nonces, events and the random seed
//! - [`traits`]: the seams a runtime fills in: calls, fees, lookups, hooks
//! - [`executive::Executive`]: the block lifecycle
//! - [`validity`]: transaction-pool verdicts
//!
//! Consensus faults during import panic. The host is expected to discard
//! every write made since the block started.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod host;
pub mod storage;
pub mod traits;
pub mod system;
pub mod config;
pub mod validity;
pub mod executive;

#[cfg(test)]
mod mock;

// Re-export key types for convenience
pub use config::{ExecutiveConfig, PriorityPolicy, ValidityConfig};
pub use executive::{BlockOf, Executive, UncheckedOf};
pub use host::{Externalities, OverlayedExternalities, TestExternalities};
pub use storage::{StorageMap, StorageValue};
pub use system::{ChainContext, EventRecord, Phase, System, SystemEvent};
pub use traits::{AccountLookup, Dispatchable, IdentityLookup, MakePayment, OnFinalise, Origin, Runtime};
