//! Block timestamp, set once per block by an inherent.

use alloc::string::String;
use alloc::vec::Vec;
use strata_engine::{Externalities, OnFinalise, Origin, StorageValue};
use strata_primitives::{
    BlockNumber, CheckInherentsResult, CodecError, Decode, DispatchError, Encode, InherentData,
    InherentError, InherentIdentifier, Reader,
};

pub type Moment = u64;

/// Inherent data key for the author's current time.
pub const INHERENT_IDENTIFIER: InherentIdentifier = *b"timstap0";

/// How far ahead of local time a block's timestamp may be before import
/// has to wait.
pub const MAX_TIMESTAMP_DRIFT: Moment = 60;

pub const NOW: StorageValue<Moment> = StorageValue::new(b"Timestamp Now");
pub const DID_UPDATE: StorageValue<bool> = StorageValue::new(b"Timestamp DidUpdate");
pub const MINIMUM_PERIOD: StorageValue<Moment> = StorageValue::new(b"Timestamp MinimumPeriod");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampCall {
    Set(Moment),
}

impl Encode for TimestampCall {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::Set(now) => {
                dest.push(0);
                now.encode_to(dest);
            }
        }
    }
}

impl Decode for TimestampCall {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::Set(Decode::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "TimestampCall", tag }),
        }
    }
}

impl TimestampCall {
    pub fn dispatch(self, origin: Origin, ext: &mut dyn Externalities) -> Result<(), DispatchError> {
        match self {
            Self::Set(now) => {
                if origin != Origin::Inherent {
                    return Err(DispatchError("bad origin: expected inherent"));
                }
                Timestamp::set(ext, now)
            }
        }
    }
}

/// Why a block's timestamp inherent was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    /// The block is valid once local time reaches this moment.
    #[error("block is valid at timestamp {0}")]
    ValidAtTimestamp(Moment),
    #[error("{0}")]
    Other(String),
}

impl TimestampError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl Encode for TimestampError {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::ValidAtTimestamp(at) => {
                dest.push(0);
                at.encode_to(dest);
            }
            Self::Other(message) => {
                dest.push(1);
                message.encode_to(dest);
            }
        }
    }
}

impl Decode for TimestampError {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::ValidAtTimestamp(Decode::decode(input)?)),
            1 => Ok(Self::Other(Decode::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "TimestampError", tag }),
        }
    }
}

pub struct Timestamp;

impl Timestamp {
    pub fn now(ext: &dyn Externalities) -> Moment {
        NOW.get(ext).unwrap_or_default()
    }

    pub fn minimum_period(ext: &dyn Externalities) -> Moment {
        MINIMUM_PERIOD.get(ext).unwrap_or_default()
    }

    pub fn set(ext: &mut dyn Externalities, now: Moment) -> Result<(), DispatchError> {
        if DID_UPDATE.exists(ext) {
            return Err(DispatchError("Timestamp must be updated only once in the block"));
        }
        let prev = Self::now(ext);
        if prev != 0 && now < prev.saturating_add(Self::minimum_period(ext)) {
            return Err(DispatchError(
                "Timestamp must increment by at least <MinimumPeriod> between sequential blocks",
            ));
        }
        NOW.put(ext, &now);
        DID_UPDATE.put(ext, &true);
        Ok(())
    }

    /// The `set` call the author should include, if the data carries a time.
    pub fn create_inherent(data: &InherentData) -> Result<Option<TimestampCall>, InherentError> {
        Ok(data.get_data::<Moment>(&INHERENT_IDENTIFIER)?.map(TimestampCall::Set))
    }

    /// Check a block's `set` call against the local clock in `data`.
    pub fn check_inherent(call: &TimestampCall, data: &InherentData) -> Result<(), TimestampError> {
        let TimestampCall::Set(t) = call;
        let local = data
            .get_data::<Moment>(&INHERENT_IDENTIFIER)
            .map_err(|err| TimestampError::Other(alloc::format!("{}", err)))?
            .ok_or_else(|| TimestampError::Other(String::from("timestamp inherent data not found")))?;
        if *t > local.saturating_add(MAX_TIMESTAMP_DRIFT) {
            return Err(TimestampError::ValidAtTimestamp(*t));
        }
        Ok(())
    }

    /// Record a failed check in `result`.
    pub fn report(result: &mut CheckInherentsResult, error: &TimestampError) {
        if let Err(err) = result.put_error(INHERENT_IDENTIFIER, error, error.is_fatal()) {
            log::warn!(target: "runtime::timestamp", "could not record inherent error: {}", err);
        }
    }
}

impl OnFinalise for Timestamp {
    fn on_finalise(&self, ext: &mut dyn Externalities, _: BlockNumber) {
        DID_UPDATE.kill(ext);
    }
}
