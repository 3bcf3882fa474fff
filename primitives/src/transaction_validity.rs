//! Verdicts handed to the transaction pool.

use alloc::vec::Vec;
use crate::codec::{Decode, Encode, Reader};
use crate::error::CodecError;

/// Higher runs first.
pub type TransactionPriority = u64;

/// Blocks for which a valid transaction stays valid.
pub type TransactionLongevity = u64;

/// Opaque marker used by the pool to order and de-duplicate transactions.
pub type TransactionTag = Vec<u8>;

/// Admissibility of a transaction against the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidity {
    /// Never valid on this chain; drop it.
    Invalid,
    /// Valid once every `requires` tag has been provided.
    Valid {
        priority: TransactionPriority,
        requires: Vec<TransactionTag>,
        provides: Vec<TransactionTag>,
        longevity: TransactionLongevity,
    },
    /// Cannot be judged yet; may become valid later.
    Unknown,
}

impl TransactionValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

impl Encode for TransactionValidity {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::Invalid => dest.push(0),
            Self::Valid { priority, requires, provides, longevity } => {
                dest.push(1);
                priority.encode_to(dest);
                requires.encode_to(dest);
                provides.encode_to(dest);
                longevity.encode_to(dest);
            }
            Self::Unknown => dest.push(2),
        }
    }
}

impl Decode for TransactionValidity {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::Invalid),
            1 => Ok(Self::Valid {
                priority: Decode::decode(input)?,
                requires: Decode::decode(input)?,
                provides: Decode::decode(input)?,
                longevity: Decode::decode(input)?,
            }),
            2 => Ok(Self::Unknown),
            tag => Err(CodecError::InvalidTag { what: "TransactionValidity", tag }),
        }
    }
}
