//! Seams between the engine and the modules a runtime is composed of.

use strata_primitives::{AccountId, Address, BlockNumber, CheckError, Decode, DispatchError, Encode};
use crate::host::Externalities;
use crate::system::SystemEvent;

/// Who dispatched a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Privileged origin; never produced by an extrinsic.
    Root,
    Signed(AccountId),
    /// An unsigned extrinsic placed by the block author.
    Inherent,
}

impl From<Option<AccountId>> for Origin {
    fn from(signer: Option<AccountId>) -> Self {
        match signer {
            Some(who) => Self::Signed(who),
            None => Self::Inherent,
        }
    }
}

impl Origin {
    pub fn signer(&self) -> Option<&AccountId> {
        match self {
            Self::Signed(who) => Some(who),
            _ => None,
        }
    }
}

/// A call that can run against state.
///
/// An `Err` is a failed extrinsic, not a failed block: the executive keeps
/// the fee and nonce bump and records `ExtrinsicFailed`.
pub trait Dispatchable {
    fn dispatch(self, origin: Origin, ext: &mut dyn Externalities) -> Result<(), DispatchError>;
}

/// Charge a signer for including an extrinsic of `encoded_len` bytes.
pub trait MakePayment {
    fn make_payment(
        &self,
        ext: &mut dyn Externalities,
        who: &AccountId,
        encoded_len: usize,
    ) -> Result<(), DispatchError>;
}

impl MakePayment for () {
    fn make_payment(&self, _: &mut dyn Externalities, _: &AccountId, _: usize) -> Result<(), DispatchError> {
        Ok(())
    }
}

/// End-of-block hook, run after the last extrinsic.
pub trait OnFinalise {
    fn on_finalise(&self, ext: &mut dyn Externalities, number: BlockNumber);
}

impl OnFinalise for () {
    fn on_finalise(&self, _: &mut dyn Externalities, _: BlockNumber) {}
}

impl<A: OnFinalise, B: OnFinalise> OnFinalise for (A, B) {
    fn on_finalise(&self, ext: &mut dyn Externalities, number: BlockNumber) {
        self.0.on_finalise(ext, number);
        self.1.on_finalise(ext, number);
    }
}

/// Resolve an [`Address`] against chain state.
pub trait AccountLookup {
    fn lookup(ext: &dyn Externalities, address: &Address) -> Result<AccountId, CheckError>;
}

/// Accepts full account ids only.
pub struct IdentityLookup;

impl AccountLookup for IdentityLookup {
    fn lookup(_: &dyn Externalities, address: &Address) -> Result<AccountId, CheckError> {
        match address {
            Address::Id(id) => Ok(*id),
            Address::Index(_) => Err(CheckError::UnknownAccountIndex),
        }
    }
}

/// The types a runtime plugs into the executive.
pub trait Runtime {
    type Call: Dispatchable + Encode + Decode;
    type Event: From<SystemEvent> + Encode + Decode;
    type Lookup: AccountLookup;
}
