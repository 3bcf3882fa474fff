//! Minimal runtime used by the engine's own tests.

use alloc::vec::Vec;
use strata_primitives::{
    crypto::sign_ed25519, extrinsic::signing_payload, AccountId, Address, BlockNumber, CodecError,
    Decode, DispatchError, Encode, Hash, Index, Reader, UncheckedExtrinsic,
};
pub use crate::host::TestExternalities;
use crate::host::Externalities;
use crate::storage::{StorageMap, StorageValue};
use crate::system::{System, SystemEvent};
use crate::traits::{Dispatchable, IdentityLookup, MakePayment, OnFinalise, Origin, Runtime};

pub const FEE: u64 = 10;
pub const GENESIS_HASH: Hash = [0x42; 32];

const BALANCE: StorageMap<AccountId, u64> = StorageMap::new(b"Test Balance");
const FINALISED: StorageValue<u32> = StorageValue::new(b"Test Finalised");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestCall {
    Noop,
    Fail,
    Store(Vec<u8>),
}

impl Encode for TestCall {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::Noop => dest.push(0),
            Self::Fail => dest.push(1),
            Self::Store(value) => {
                dest.push(2);
                value.encode_to(dest);
            }
        }
    }
}

impl Decode for TestCall {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::Noop),
            1 => Ok(Self::Fail),
            2 => Ok(Self::Store(Decode::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "TestCall", tag }),
        }
    }
}

impl Dispatchable for TestCall {
    fn dispatch(self, _origin: Origin, ext: &mut dyn Externalities) -> Result<(), DispatchError> {
        match self {
            Self::Noop => Ok(()),
            Self::Fail => Err(DispatchError("test call failed")),
            Self::Store(value) => {
                ext.set_storage(b"test:stored", &value);
                Ok(())
            }
        }
    }
}

pub struct TestRuntime;

impl Runtime for TestRuntime {
    type Call = TestCall;
    type Event = SystemEvent;
    type Lookup = IdentityLookup;
}

pub type TestExtrinsic = UncheckedExtrinsic<TestCall>;

/// Flat fee per extrinsic, taken from a plain balance map.
pub struct FlatFee(pub u64);

impl MakePayment for FlatFee {
    fn make_payment(&self, ext: &mut dyn Externalities, who: &AccountId, _: usize) -> Result<(), DispatchError> {
        let balance = BALANCE.get(ext, who).unwrap_or_default();
        let remaining = balance.checked_sub(self.0).ok_or(DispatchError("too poor"))?;
        BALANCE.insert(ext, who, &remaining);
        Ok(())
    }
}

/// Counts end-of-block calls.
pub struct CountFinalise;

impl OnFinalise for CountFinalise {
    fn on_finalise(&self, ext: &mut dyn Externalities, _: BlockNumber) {
        FINALISED.mutate(ext, |count| *count += 1);
    }
}

pub fn finalise_count(ext: &TestExternalities) -> u32 {
    FINALISED.get(ext).unwrap_or_default()
}

pub fn balance(ext: &TestExternalities, who: &AccountId) -> u64 {
    BALANCE.get(ext, who).unwrap_or_default()
}

/// Committed state with the genesis hash recorded and `balances` funded.
pub fn genesis(balances: &[(AccountId, u64)]) -> TestExternalities {
    let mut ext = TestExternalities::default();
    System::<SystemEvent>::new(&mut ext).record_block_hash(0, &GENESIS_HASH);
    for (who, amount) in balances {
        BALANCE.insert(&mut ext, who, amount);
    }
    ext.commit();
    ext
}

pub fn keypair(seed: u8) -> (AccountId, ed25519_dalek::SigningKey) {
    let sk = ed25519_dalek::SigningKey::from_bytes(&[seed; 32]);
    (*sk.verifying_key().as_bytes(), sk)
}

pub fn signed(call: TestCall, index: Index, sk: &ed25519_dalek::SigningKey) -> TestExtrinsic {
    let who = *sk.verifying_key().as_bytes();
    let signature = sign_ed25519(&signing_payload(index, &call), sk);
    UncheckedExtrinsic::new_signed(call, Address::Id(who), signature, index)
}

pub fn root_of(extrinsics: &[TestExtrinsic]) -> Hash {
    let encoded: Vec<Vec<u8>> = extrinsics.iter().map(Encode::encode).collect();
    strata_primitives::enumerated_trie_root(&encoded)
}
