//! System state: block metadata, account nonces, extrinsic bookkeeping,
//! events and the random seed.
//!
//! All values live in storage through the handle passed to [`System::new`].
//! Block-transient entries (`ExtrinsicIndex`, `ExtrinsicCount`,
//! `ExtrinsicData`, `RandomSeed`, `Number`, `ParentHash`,
//! `ExtrinsicsRoot`, `Digest`) are written during the block and removed by
//! the time [`System::finalise`] returns. `Events` survives until the next
//! block is initialised.

use core::marker::PhantomData;
use alloc::vec::Vec;
use strata_primitives::{
    AccountId, Address, BlockNumber, CheckContext, CheckError, CodecError, Decode, Digest,
    DigestItem, DispatchError, Encode, Hash, Header, Index, Reader, Signature, ZERO_HASH,
};
use crate::host::Externalities;
use crate::storage::{unhashed, StorageMap, StorageValue};
use crate::traits::AccountLookup;

/// Unhashed key of the index of the extrinsic being applied.
pub const EXTRINSIC_INDEX: &[u8] = b":extrinsic_index";

/// Number of ancestor hashes mixed into the random seed.
pub const RANDOM_MATERIAL_LEN: u64 = 81;

pub const BLOCK_HASH: StorageMap<BlockNumber, Hash> = StorageMap::new(b"System BlockHash");
pub const ACCOUNT_NONCE: StorageMap<AccountId, Index> = StorageMap::new(b"System AccountNonce");
pub const EXTRINSIC_DATA: StorageMap<u32, Vec<u8>> = StorageMap::new(b"System ExtrinsicData");
pub const NUMBER: StorageValue<BlockNumber> = StorageValue::new(b"System Number");
pub const PARENT_HASH: StorageValue<Hash> = StorageValue::new(b"System ParentHash");
pub const EXTRINSICS_ROOT: StorageValue<Hash> = StorageValue::new(b"System ExtrinsicsRoot");
pub const DIGEST: StorageValue<Digest> = StorageValue::new(b"System Digest");
pub const EXTRINSIC_COUNT: StorageValue<u32> = StorageValue::new(b"System ExtrinsicCount");
pub const RANDOM_SEED: StorageValue<Hash> = StorageValue::new(b"System RandomSeed");

const EVENTS_PREFIX: &[u8] = b"System Events";

fn events_store<E>() -> StorageValue<Vec<EventRecord<E>>> {
    StorageValue::new(EVENTS_PREFIX)
}

/// When an event was deposited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    ApplyExtrinsic(u32),
    Finalization,
}

impl Encode for Phase {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::ApplyExtrinsic(index) => {
                dest.push(0);
                index.encode_to(dest);
            }
            Self::Finalization => dest.push(1),
        }
    }
}

impl Decode for Phase {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::ApplyExtrinsic(Decode::decode(input)?)),
            1 => Ok(Self::Finalization),
            tag => Err(CodecError::InvalidTag { what: "Phase", tag }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord<E> {
    pub phase: Phase,
    pub event: E,
}

impl<E: Encode> Encode for EventRecord<E> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.phase.encode_to(dest);
        self.event.encode_to(dest);
    }
}

impl<E: Decode> Decode for EventRecord<E> {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            phase: Decode::decode(input)?,
            event: Decode::decode(input)?,
        })
    }
}

/// Events emitted by the system itself, one per applied extrinsic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemEvent {
    ExtrinsicSuccess,
    ExtrinsicFailed,
}

impl Encode for SystemEvent {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.push(match self {
            Self::ExtrinsicSuccess => 0,
            Self::ExtrinsicFailed => 1,
        });
    }
}

impl Decode for SystemEvent {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::ExtrinsicSuccess),
            1 => Ok(Self::ExtrinsicFailed),
            tag => Err(CodecError::InvalidTag { what: "SystemEvent", tag }),
        }
    }
}

/// Bytewise majority of three hashes.
fn majority(a: &Hash, b: &Hash, c: &Hash) -> Hash {
    let mut out = ZERO_HASH;
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = (a[i] & b[i]) | (b[i] & c[i]) | (a[i] & c[i]);
    }
    out
}

/// Reduce a list of hashes to one by repeated majority vote over
/// consecutive triplets.
///
/// The result is fully determined by the input; a single outlier in any
/// triplet cannot flip a bit. A trailing group shorter than three keeps
/// its first hash.
pub fn triplet_mix(hashes: &[Hash]) -> Hash {
    match hashes {
        [] => ZERO_HASH,
        [only] => *only,
        _ => {
            let reduced: Vec<Hash> = hashes
                .chunks(3)
                .map(|chunk| match chunk {
                    [a, b, c] => majority(a, b, c),
                    [first, ..] => *first,
                    [] => ZERO_HASH,
                })
                .collect();
            triplet_mix(&reduced)
        }
    }
}

/// Typed access to system storage.
pub struct System<'a, E> {
    ext: &'a mut dyn Externalities,
    _event: PhantomData<E>,
}

impl<'a, E> System<'a, E>
where
    E: Encode + Decode + From<SystemEvent>,
{
    pub fn new(ext: &'a mut dyn Externalities) -> Self {
        Self { ext, _event: PhantomData }
    }

    /// Start a block.
    ///
    /// Records the parent hash under `number - 1` unless a hash is already
    /// stored there, computes the random seed and clears last block's
    /// events.
    ///
    /// # Panics
    ///
    /// When `number` is zero.
    pub fn initialise(&mut self, number: BlockNumber, parent_hash: &Hash, txs_root: &Hash) {
        unhashed::put(self.ext, EXTRINSIC_INDEX, &0u32);
        NUMBER.put(self.ext, &number);
        PARENT_HASH.put(self.ext, parent_hash);
        if let Some(parent_number) = number.checked_sub(1) {
            self.record_block_hash(parent_number, parent_hash);
        }
        EXTRINSICS_ROOT.put(self.ext, txs_root);
        let seed = self.calculate_random();
        RANDOM_SEED.put(self.ext, &seed);
        events_store::<E>().kill(self.ext);
        log::debug!(
            target: "runtime::system",
            "initialised block #{} on parent {}",
            number,
            strata_primitives::types::hash_to_hex(parent_hash),
        );
    }

    /// Remove the block-transient entries and assemble the header.
    ///
    /// The state root is read after the transient entries are gone, so it
    /// commits only to persistent state. A `ChangesTrieRoot` digest item
    /// is appended when the host builds changes tries.
    pub fn finalise(&mut self) -> Header {
        RANDOM_SEED.kill(self.ext);
        EXTRINSIC_COUNT.kill(self.ext);

        let number = NUMBER.take(self.ext).unwrap_or_default();
        let parent_hash = PARENT_HASH.take(self.ext).unwrap_or_default();
        let mut digest = DIGEST.take(self.ext).unwrap_or_default();
        let extrinsics_root = EXTRINSICS_ROOT.take(self.ext).unwrap_or_default();

        let state_root = self.ext.storage_root();
        if let Some(root) = self
            .ext
            .storage_changes_root(&parent_hash, number.saturating_sub(1))
        {
            digest.push(DigestItem::ChangesTrieRoot(root));
        }

        log::debug!(
            target: "runtime::system",
            "finalised block #{}: state root {}",
            number,
            strata_primitives::types::hash_to_hex(&state_root),
        );

        Header { parent_hash, number, state_root, extrinsics_root, digest }
    }

    /// Seed derived from the last [`RANDOM_MATERIAL_LEN`] block hashes.
    ///
    /// Blocks before genesis read as block 0; unknown hashes read as zero.
    ///
    /// # Panics
    ///
    /// When the current block number is zero.
    pub fn calculate_random(&self) -> Hash {
        let number = self.block_number();
        assert!(number > 0, "Block number may never be zero");
        let material: Vec<Hash> = (1..=RANDOM_MATERIAL_LEN)
            .map(|back| self.block_hash(number.saturating_sub(back)))
            .collect();
        triplet_mix(&material)
    }

    /// Store `hash` under `number` unless a hash is already recorded.
    /// Returns whether it was written.
    pub fn record_block_hash(&mut self, number: BlockNumber, hash: &Hash) -> bool {
        if BLOCK_HASH.contains_key(&*self.ext, &number) {
            return false;
        }
        BLOCK_HASH.insert(self.ext, &number, hash);
        true
    }

    pub fn block_hash(&self, number: BlockNumber) -> Hash {
        BLOCK_HASH.get(&*self.ext, &number).unwrap_or(ZERO_HASH)
    }

    pub fn block_number(&self) -> BlockNumber {
        NUMBER.get(&*self.ext).unwrap_or_default()
    }

    pub fn parent_hash(&self) -> Hash {
        PARENT_HASH.get(&*self.ext).unwrap_or(ZERO_HASH)
    }

    pub fn extrinsics_root(&self) -> Hash {
        EXTRINSICS_ROOT.get(&*self.ext).unwrap_or(ZERO_HASH)
    }

    pub fn random_seed(&self) -> Hash {
        RANDOM_SEED.get(&*self.ext).unwrap_or(ZERO_HASH)
    }

    pub fn digest(&self) -> Digest {
        DIGEST.get(&*self.ext).unwrap_or_default()
    }

    pub fn account_nonce(&self, who: &AccountId) -> Index {
        ACCOUNT_NONCE.get(&*self.ext, who).unwrap_or_default()
    }

    pub fn inc_account_nonce(&mut self, who: &AccountId) {
        ACCOUNT_NONCE.mutate(self.ext, who, |nonce| *nonce += 1);
    }

    /// Index of the extrinsic being applied, if a block is executing.
    pub fn extrinsic_index(&self) -> Option<u32> {
        unhashed::get(&*self.ext, EXTRINSIC_INDEX)
    }

    pub fn extrinsic_count(&self) -> u32 {
        EXTRINSIC_COUNT.get(&*self.ext).unwrap_or_default()
    }

    /// Keep the encoded bytes of the current extrinsic for the
    /// extrinsics root.
    pub fn note_extrinsic(&mut self, encoded: Vec<u8>) {
        let index = self.extrinsic_index().unwrap_or_default();
        EXTRINSIC_DATA.insert(self.ext, &index, &encoded);
    }

    /// Emit the outcome event and advance the extrinsic index.
    pub fn note_applied_extrinsic(&mut self, result: &Result<(), DispatchError>) {
        let event = match result {
            Ok(()) => SystemEvent::ExtrinsicSuccess,
            Err(_) => SystemEvent::ExtrinsicFailed,
        };
        self.deposit_event(event.into());
        let next = self.extrinsic_index().unwrap_or_default() + 1;
        unhashed::put(self.ext, EXTRINSIC_INDEX, &next);
    }

    /// Move the extrinsic index into `ExtrinsicCount`. Events deposited
    /// afterwards belong to the finalization phase.
    pub fn note_finished_extrinsics(&mut self) {
        let count: u32 = unhashed::take(self.ext, EXTRINSIC_INDEX).unwrap_or_default();
        EXTRINSIC_COUNT.put(self.ext, &count);
    }

    /// Recompute `ExtrinsicsRoot` from the noted extrinsics, consuming them.
    pub fn derive_extrinsics(&mut self) {
        let count = self.extrinsic_count();
        let extrinsics: Vec<Vec<u8>> = (0..count)
            .map(|i| EXTRINSIC_DATA.take(self.ext, &i).unwrap_or_default())
            .collect();
        let root = self.ext.enumerated_trie_root(&extrinsics);
        EXTRINSICS_ROOT.put(self.ext, &root);
    }

    pub fn deposit_event(&mut self, event: E) {
        let phase = match self.extrinsic_index() {
            Some(index) => Phase::ApplyExtrinsic(index),
            None => Phase::Finalization,
        };
        events_store::<E>().mutate(self.ext, |events| events.push(EventRecord { phase, event }));
    }

    pub fn deposit_log(&mut self, item: DigestItem) {
        DIGEST.mutate(self.ext, |digest| digest.push(item));
    }

    pub fn events(&self) -> Vec<EventRecord<E>> {
        events_store::<E>().get(&*self.ext).unwrap_or_default()
    }
}

/// [`CheckContext`] backed by chain state: addresses resolve through
/// `L`, signatures through the host.
pub struct ChainContext<'a, L> {
    ext: &'a dyn Externalities,
    _lookup: PhantomData<L>,
}

impl<'a, L> ChainContext<'a, L> {
    pub fn new(ext: &'a dyn Externalities) -> Self {
        Self { ext, _lookup: PhantomData }
    }
}

impl<L: AccountLookup> CheckContext for ChainContext<'_, L> {
    fn lookup(&self, address: &Address) -> Result<AccountId, CheckError> {
        L::lookup(self.ext, address)
    }

    fn verify(&self, message: &[u8], signature: &Signature, signer: &AccountId) -> bool {
        self.ext.verify_ed25519(message, signature, signer)
    }
}
