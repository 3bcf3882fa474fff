//! `strata-runtime`: a small runtime built on `strata-engine`.
//!
//! Wires the system, timestamp, indices and balances modules into one
//! `Call` and one `Event` type and exposes them through the entry points
//! in [`api`]. Balances pays transaction fees; timestamp runs at the end
//! of every block.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod indices;
pub mod balances;
pub mod timestamp;
pub mod genesis;
pub mod api;

use alloc::borrow::Cow;
use alloc::vec::Vec;
use strata_engine::{Dispatchable, Externalities, Origin, SystemEvent};
use strata_primitives::{CodecError, Decode, DispatchError, Encode, Reader, RuntimeVersion};

pub use balances::{Balance, Balances, BalancesCall, BalancesEvent};
pub use genesis::{GenesisConfig, GenesisError};
pub use indices::{Indices, IndicesEvent};
pub use timestamp::{Moment, Timestamp, TimestampCall};

pub const VERSION: RuntimeVersion = RuntimeVersion {
    spec_name: Cow::Borrowed("strata-test"),
    impl_name: Cow::Borrowed("strata-test-runtime"),
    authoring_version: 1,
    spec_version: 1,
    impl_version: 1,
    apis: Cow::Borrowed(&[]),
};

/// Calls of the system module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCall {
    /// Does nothing; the bytes only end up in the block.
    Remark(Vec<u8>),
}

impl Encode for SystemCall {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::Remark(data) => {
                dest.push(0);
                data.encode_to(dest);
            }
        }
    }
}

impl Decode for SystemCall {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::Remark(Decode::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "SystemCall", tag }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    System(SystemCall),
    Timestamp(TimestampCall),
    Balances(BalancesCall),
}

impl Encode for Call {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::System(call) => {
                dest.push(0);
                call.encode_to(dest);
            }
            Self::Timestamp(call) => {
                dest.push(1);
                call.encode_to(dest);
            }
            Self::Balances(call) => {
                dest.push(2);
                call.encode_to(dest);
            }
        }
    }
}

impl Decode for Call {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::System(Decode::decode(input)?)),
            1 => Ok(Self::Timestamp(Decode::decode(input)?)),
            2 => Ok(Self::Balances(Decode::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "Call", tag }),
        }
    }
}

impl Dispatchable for Call {
    fn dispatch(self, origin: Origin, ext: &mut dyn Externalities) -> Result<(), DispatchError> {
        match self {
            Self::System(SystemCall::Remark(_)) => Ok(()),
            Self::Timestamp(call) => call.dispatch(origin, ext),
            Self::Balances(call) => call.dispatch(origin, ext),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    System(SystemEvent),
    Indices(IndicesEvent),
    Balances(BalancesEvent),
}

impl From<SystemEvent> for Event {
    fn from(event: SystemEvent) -> Self {
        Self::System(event)
    }
}

impl From<IndicesEvent> for Event {
    fn from(event: IndicesEvent) -> Self {
        Self::Indices(event)
    }
}

impl From<BalancesEvent> for Event {
    fn from(event: BalancesEvent) -> Self {
        Self::Balances(event)
    }
}

impl Encode for Event {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::System(event) => {
                dest.push(0);
                event.encode_to(dest);
            }
            Self::Indices(event) => {
                dest.push(1);
                event.encode_to(dest);
            }
            Self::Balances(event) => {
                dest.push(2);
                event.encode_to(dest);
            }
        }
    }
}

impl Decode for Event {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::System(Decode::decode(input)?)),
            1 => Ok(Self::Indices(Decode::decode(input)?)),
            2 => Ok(Self::Balances(Decode::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "Event", tag }),
        }
    }
}

/// The runtime's type bundle.
pub struct Runtime;

impl strata_engine::Runtime for Runtime {
    type Call = Call;
    type Event = Event;
    type Lookup = Indices;
}

pub type UncheckedExtrinsic = strata_primitives::UncheckedExtrinsic<Call>;
pub type Block = strata_primitives::Block<UncheckedExtrinsic>;
pub type EventRecord = strata_engine::EventRecord<Event>;
pub type System<'a> = strata_engine::System<'a, Event>;

/// Modules with an end-of-block hook.
pub type AllModules = Timestamp;

pub type Executive<'a> = strata_engine::Executive<'a, Runtime, Balances, AllModules>;

/// An executive for this runtime over `ext`.
pub fn executive(ext: &mut dyn Externalities) -> Executive<'_> {
    Executive::new(ext, Balances, Timestamp)
}
