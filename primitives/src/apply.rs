//! Outcome of applying one extrinsic.

use alloc::vec::Vec;
use crate::codec::{Decode, Encode, Reader};
use crate::error::CodecError;

/// The extrinsic was included; the call itself may still have failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApplyOutcome {
    Success = 0,
    /// Dispatch returned an error. Fee and nonce are still consumed.
    Fail = 1,
}

/// The extrinsic could not be included at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApplyError {
    BadSignature = 0,
    /// Nonce below the account's current nonce.
    Stale = 1,
    /// Nonce above the account's current nonce.
    Future = 2,
    /// Sender cannot pay the fee.
    CantPay = 3,
}

/// Encoded as `Result`: tag 0 + outcome, or tag 1 + error.
pub type ApplyResult = Result<ApplyOutcome, ApplyError>;

impl Encode for ApplyOutcome {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.push(*self as u8);
    }
}

impl Decode for ApplyOutcome {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::Success),
            1 => Ok(Self::Fail),
            tag => Err(CodecError::InvalidTag { what: "ApplyOutcome", tag }),
        }
    }
}

impl Encode for ApplyError {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.push(*self as u8);
    }
}

impl Decode for ApplyError {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::BadSignature),
            1 => Ok(Self::Stale),
            2 => Ok(Self::Future),
            3 => Ok(Self::CantPay),
            tag => Err(CodecError::InvalidTag { what: "ApplyError", tag }),
        }
    }
}
