//! Shared test helpers for integration tests.
//!
//! Provides deterministic keypairs, a standard genesis, extrinsic signing
//! and block authoring helpers used across all integration test files.

#![allow(dead_code)]

use strata_engine::TestExternalities;
use strata_primitives::{
    crypto::sign_ed25519, extrinsic::signing_payload, AccountId, Address, Header, Index,
    InherentData,
};
use strata_runtime::{
    api, timestamp, Balance, BalancesCall, Block, Call, GenesisConfig, SystemCall,
    UncheckedExtrinsic,
};

pub const ALICE_ENDOWMENT: Balance = 1_000;
pub const BOB_ENDOWMENT: Balance = 500;
pub const BASE_FEE: Balance = 1;

/// Install a test logger. Safe to call from every test.
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ── Deterministic Keypairs ──

/// Create a deterministic Ed25519 signing key from a single seed byte.
///
/// The secret key is `[seed; 32]`, giving reproducible keys across machines.
pub fn deterministic_keypair(seed: u8) -> (AccountId, ed25519_dalek::SigningKey) {
    let signing_key = ed25519_dalek::SigningKey::from_bytes(&[seed; 32]);
    (*signing_key.verifying_key().as_bytes(), signing_key)
}

/// Alice: seed=1, endowed at genesis with index 0.
pub fn alice() -> (AccountId, ed25519_dalek::SigningKey) {
    deterministic_keypair(1)
}

/// Bob: seed=2, endowed at genesis with index 1.
pub fn bob() -> (AccountId, ed25519_dalek::SigningKey) {
    deterministic_keypair(2)
}

/// Charlie: seed=3, not endowed.
pub fn charlie() -> (AccountId, ed25519_dalek::SigningKey) {
    deterministic_keypair(3)
}

// ── Genesis ──

pub fn genesis_config() -> GenesisConfig {
    GenesisConfig {
        balances: vec![(alice().0, ALICE_ENDOWMENT), (bob().0, BOB_ENDOWMENT)],
        transaction_base_fee: BASE_FEE,
        transaction_byte_fee: 0,
        minimum_period: 1,
    }
}

/// Committed genesis state and the genesis header.
pub fn new_test_ext() -> (TestExternalities, Header) {
    init_logger();
    match genesis_config().build_externalities() {
        Ok(built) => built,
        Err(err) => panic!("genesis must build: {}", err),
    }
}

// ── Extrinsics ──

pub fn sign(call: Call, nonce: Index, signing_key: &ed25519_dalek::SigningKey) -> UncheckedExtrinsic {
    let who = *signing_key.verifying_key().as_bytes();
    let signature = sign_ed25519(&signing_payload(nonce, &call), signing_key);
    UncheckedExtrinsic::new_signed(call, Address::Id(who), signature, nonce)
}

pub fn transfer(
    signing_key: &ed25519_dalek::SigningKey,
    nonce: Index,
    dest: AccountId,
    value: Balance,
) -> UncheckedExtrinsic {
    sign(
        Call::Balances(BalancesCall::Transfer { dest: Address::Id(dest), value }),
        nonce,
        signing_key,
    )
}

pub fn remark(signing_key: &ed25519_dalek::SigningKey, nonce: Index, data: &[u8]) -> UncheckedExtrinsic {
    sign(Call::System(SystemCall::Remark(data.to_vec())), nonce, signing_key)
}

pub fn timestamp_inherent(now: u64) -> Vec<UncheckedExtrinsic> {
    let mut data = InherentData::new();
    data.put_data(timestamp::INHERENT_IDENTIFIER, &now).expect("fresh inherent data");
    api::inherent_extrinsics(&data).expect("timestamp data decodes")
}

// ── Blocks ──

/// Header skeleton for the child of `parent`.
pub fn child_header(parent: &Header) -> Header {
    Header { parent_hash: parent.hash(), number: parent.number + 1, ..Header::default() }
}

/// Author a block on top of `parent` through the block-builder API.
///
/// Extrinsics rejected by `apply_extrinsic` are left out, as a real
/// author would do. `ext` holds the post-block state afterwards.
pub fn build_block(
    ext: &mut TestExternalities,
    parent: &Header,
    extrinsics: Vec<UncheckedExtrinsic>,
) -> Block {
    api::initialise_block(ext, &child_header(parent));
    let included: Vec<UncheckedExtrinsic> = extrinsics
        .into_iter()
        .filter(|uxt| api::apply_extrinsic(ext, uxt.clone()).is_ok())
        .collect();
    let header = api::finalise_block(ext);
    Block::new(header, included)
}

/// Header for importing `extrinsics` on top of `parent` whose state root
/// and digest are yet unknown; useful for fatal-path tests.
pub fn unchecked_block(parent: &Header, extrinsics: Vec<UncheckedExtrinsic>) -> Block {
    let encoded: Vec<Vec<u8>> = extrinsics.iter().map(strata_primitives::Encode::encode).collect();
    let header = Header {
        extrinsics_root: strata_primitives::enumerated_trie_root(&encoded),
        ..child_header(parent)
    };
    Block::new(header, extrinsics)
}
