//! The executive: drives a block through initialise, apply and finalise.
//!
//! Two paths share the same state machine:
//!
//! - **Import** ([`Executive::execute_block`]): a complete block is checked
//!   against the state it produces. Any disagreement is a consensus fault
//!   and panics; the caller discards the block's writes.
//! - **Authoring** ([`Executive::initialise_block`],
//!   [`Executive::apply_extrinsic`], [`Executive::finalise_block`]): the
//!   block is assembled one extrinsic at a time and the header is derived
//!   from the resulting state.
//!
//! Both leave identical state and produce identical headers for the same
//! extrinsics.
//!
//! Per extrinsic, the executive checks the signature, compares the nonce
//! with the sender's account nonce, charges the fee and bumps the nonce
//! before dispatching. A dispatch error fails the extrinsic but keeps the
//! fee and the nonce bump.

use core::marker::PhantomData;
use alloc::vec::Vec;
use strata_primitives::{
    types::hash_to_hex, Applyable, ApplyError, ApplyOutcome, ApplyResult, Block, Checkable,
    Encode, Header, TransactionValidity, UncheckedExtrinsic,
};
use crate::config::ExecutiveConfig;
use crate::host::Externalities;
use crate::system::{ChainContext, System};
use crate::traits::{Dispatchable, MakePayment, OnFinalise, Origin, Runtime};
use crate::validity;

pub type UncheckedOf<R> = UncheckedExtrinsic<<R as Runtime>::Call>;
pub type BlockOf<R> = Block<UncheckedOf<R>>;

/// Drives one block of runtime `R` over a host handle.
///
/// `P` charges transaction fees and `F` runs at the end of every block.
/// Construct one per block or per validation call.
pub struct Executive<'a, R: Runtime, P = (), F = ()> {
    ext: &'a mut dyn Externalities,
    payment: P,
    finalization: F,
    config: ExecutiveConfig,
    _runtime: PhantomData<R>,
}

impl<'a, R: Runtime> Executive<'a, R> {
    /// An executive without fees or end-of-block hooks.
    pub fn bare(ext: &'a mut dyn Externalities) -> Self {
        Self::new(ext, (), ())
    }
}

impl<'a, R, P, F> Executive<'a, R, P, F>
where
    R: Runtime,
    P: MakePayment,
    F: OnFinalise,
{
    pub fn new(ext: &'a mut dyn Externalities, payment: P, finalization: F) -> Self {
        Self {
            ext,
            payment,
            finalization,
            config: ExecutiveConfig::default(),
            _runtime: PhantomData,
        }
    }

    pub fn with_config(mut self, config: ExecutiveConfig) -> Self {
        self.config = config;
        self
    }

    fn system(&mut self) -> System<'_, R::Event> {
        System::new(&mut *self.ext)
    }

    /// Start a block from its (partial) header.
    pub fn initialise_block(&mut self, header: &Header) {
        self.system()
            .initialise(header.number, &header.parent_hash, &header.extrinsics_root);
    }

    /// Import a complete block.
    ///
    /// The parent hash is checked against `BlockHash[number - 1]`. Only the
    /// genesis hash is recorded up front; for later heights the entry is
    /// filled from the first header that claims it, so the check catches
    /// a claim that conflicts with one already imported, not a first claim.
    ///
    /// # Panics
    ///
    /// When the parent hash, extrinsics root, any extrinsic's signature,
    /// nonce or fee, the digest or the state root disagrees with what
    /// execution produces.
    pub fn execute_block(&mut self, block: BlockOf<R>) {
        log::debug!(
            target: "runtime::executive",
            "executing block #{} with {} extrinsics",
            block.header.number,
            block.extrinsics.len(),
        );
        self.initialise_block(&block.header);
        self.initial_checks(&block);

        let (header, extrinsics) = block.deconstruct();
        for uxt in extrinsics {
            self.apply_extrinsic_no_note(uxt);
        }

        self.system().note_finished_extrinsics();
        self.finalization.on_finalise(&mut *self.ext, header.number);
        self.final_checks(&header);
    }

    fn initial_checks(&mut self, block: &BlockOf<R>) {
        let header = &block.header;

        let parent_number = header.number.saturating_sub(1);
        assert!(
            header.number > 0 && self.system().block_hash(parent_number) == header.parent_hash,
            "Parent hash should be valid."
        );

        let encoded: Vec<Vec<u8>> = block.extrinsics.iter().map(Encode::encode).collect();
        let root = self.ext.enumerated_trie_root(&encoded);
        assert!(header.extrinsics_root == root, "Transaction trie root must be valid.");
    }

    fn final_checks(&mut self, header: &Header) {
        let computed = self.system().finalise();

        let expected_items = header.digest.logs();
        let computed_items = computed.digest.logs();
        assert!(
            expected_items.len() == computed_items.len(),
            "Number of digest items must match that calculated."
        );
        for (expected, computed) in expected_items.iter().zip(computed_items) {
            assert!(expected == computed, "Digest item must match that calculated.");
        }

        assert!(
            header.state_root == computed.state_root,
            "Storage root must match that calculated."
        );
        log::debug!(
            target: "runtime::executive",
            "imported block #{} with state root {}",
            header.number,
            hash_to_hex(&computed.state_root),
        );
    }

    /// Apply one extrinsic while authoring and record it for the
    /// extrinsics root.
    ///
    /// `Err` means the extrinsic must not be included: nothing was written.
    /// `Ok(Fail)` means it was included and charged but its call failed.
    pub fn apply_extrinsic(&mut self, uxt: UncheckedOf<R>) -> ApplyResult {
        let encoded = uxt.encode();
        let encoded_len = encoded.len();
        self.apply_extrinsic_with_len(uxt, encoded_len, Some(encoded))
    }

    fn apply_extrinsic_no_note(&mut self, uxt: UncheckedOf<R>) {
        let encoded_len = uxt.encode().len();
        match self.apply_extrinsic_with_len(uxt, encoded_len, None) {
            Ok(ApplyOutcome::Success) => (),
            Ok(ApplyOutcome::Fail) => self.ext.print("Error applying extrinsic"),
            Err(ApplyError::CantPay) => {
                panic!("All extrinsics should have sender able to pay their fees")
            }
            Err(ApplyError::BadSignature) => panic!("All extrinsics should be properly signed"),
            Err(ApplyError::Stale) | Err(ApplyError::Future) => {
                panic!("All extrinsics should have the correct nonce")
            }
        }
    }

    fn apply_extrinsic_with_len(
        &mut self,
        uxt: UncheckedOf<R>,
        encoded_len: usize,
        to_note: Option<Vec<u8>>,
    ) -> ApplyResult {
        let xt = uxt
            .check(&ChainContext::<R::Lookup>::new(&*self.ext))
            .map_err(|err| {
                log::debug!(target: "runtime::executive", "extrinsic failed check: {}", err);
                ApplyError::BadSignature
            })?;

        if let (Some(sender), Some(index)) = (xt.sender().copied(), xt.index().copied()) {
            let expected = self.system().account_nonce(&sender);
            if index != expected {
                return Err(if index < expected {
                    ApplyError::Stale
                } else {
                    ApplyError::Future
                });
            }
            self.payment
                .make_payment(&mut *self.ext, &sender, encoded_len)
                .map_err(|err| {
                    log::debug!(target: "runtime::executive", "fee payment failed: {}", err);
                    ApplyError::CantPay
                })?;
            self.system().inc_account_nonce(&sender);
        }

        if let Some(encoded) = to_note {
            self.system().note_extrinsic(encoded);
        }

        let (call, signer) = xt.deconstruct();
        let result = call.dispatch(Origin::from(signer), &mut *self.ext);
        if let Err(err) = &result {
            log::warn!(target: "runtime::executive", "extrinsic dispatch failed: {}", err);
        }
        self.system().note_applied_extrinsic(&result);

        Ok(match result {
            Ok(()) => ApplyOutcome::Success,
            Err(_) => ApplyOutcome::Fail,
        })
    }

    /// Close an authored block and return its header.
    ///
    /// The extrinsics root is recomputed from the applied extrinsics and
    /// the state root is read after the block-transient entries are gone.
    pub fn finalise_block(&mut self) -> Header {
        self.system().note_finished_extrinsics();
        let number = self.system().block_number();
        self.finalization.on_finalise(&mut *self.ext, number);
        self.system().derive_extrinsics();
        self.system().finalise()
    }

    /// Judge a transaction for the pool without touching state.
    pub fn validate_transaction(&self, uxt: UncheckedOf<R>) -> TransactionValidity {
        validity::validate_transaction::<R, P>(&*self.ext, &self.payment, &self.config.validity, uxt)
    }
}
