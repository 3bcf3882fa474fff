//! Transaction validity judgement for the pool.
//!
//! Runs against a throwaway view of state: the fee dry-run and anything
//! else written while judging is dropped with the view.

use alloc::vec;
use alloc::vec::Vec;
use strata_primitives::{
    Applyable, CheckError, Checkable, Encode, TransactionValidity, UncheckedExtrinsic,
};
use crate::config::ValidityConfig;
use crate::host::{Externalities, OverlayedExternalities};
use crate::system::{ChainContext, System};
use crate::traits::{MakePayment, Runtime};

/// Judge `uxt` against the state visible through `ext`.
///
/// `ext` is wrapped in an [`OverlayedExternalities`] so the caller's state
/// is never touched.
pub fn validate_transaction<R, P>(
    ext: &dyn Externalities,
    payment: &P,
    config: &ValidityConfig,
    uxt: UncheckedExtrinsic<R::Call>,
) -> TransactionValidity
where
    R: Runtime,
    P: MakePayment,
{
    let mut view = OverlayedExternalities::new(ext);
    judge::<R, P>(&mut view, payment, config, uxt)
}

fn judge<R, P>(
    ext: &mut dyn Externalities,
    payment: &P,
    config: &ValidityConfig,
    uxt: UncheckedExtrinsic<R::Call>,
) -> TransactionValidity
where
    R: Runtime,
    P: MakePayment,
{
    let encoded_len = uxt.encode().len();

    let xt = match uxt.check(&ChainContext::<R::Lookup>::new(&*ext)) {
        Ok(xt) => xt,
        // The index may be assigned by a transaction still in the pool.
        Err(CheckError::UnknownAccountIndex) => return TransactionValidity::Unknown,
        Err(err) => {
            log::trace!(target: "runtime::validity", "rejecting transaction: {}", err);
            return TransactionValidity::Invalid;
        }
    };

    let (Some(sender), Some(index)) = (xt.sender().copied(), xt.index().copied()) else {
        return TransactionValidity::Invalid;
    };

    if let Err(err) = payment.make_payment(ext, &sender, encoded_len) {
        log::trace!(target: "runtime::validity", "sender cannot pay: {}", err);
        return TransactionValidity::Invalid;
    }

    let expected = System::<R::Event>::new(ext).account_nonce(&sender);
    if index < expected {
        return TransactionValidity::Invalid;
    }
    if index > expected.saturating_add(config.max_future_nonces) {
        return TransactionValidity::Unknown;
    }

    let requires: Vec<Vec<u8>> = (expected..index).map(|n| (sender, n).encode()).collect();
    let provides = vec![(sender, index).encode()];

    TransactionValidity::Valid {
        priority: config.priority.priority(encoded_len),
        requires,
        provides,
        longevity: config.longevity,
    }
}
