//! Executive configuration.
//!
//! Defaults reproduce the pool behaviour every node must agree on; a
//! runtime only overrides them for local tooling.

use strata_primitives::transaction_validity::{TransactionLongevity, TransactionPriority};

/// Default number of nonces a transaction may run ahead of its sender.
pub const DEFAULT_MAX_FUTURE_NONCES: u64 = 256;

/// How a valid transaction is prioritised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "snake_case"))]
pub enum PriorityPolicy {
    /// Priority equals the encoded length in bytes.
    #[default]
    EncodedLength,
    /// Every transaction gets the same priority.
    Fixed(TransactionPriority),
}

impl PriorityPolicy {
    pub fn priority(&self, encoded_len: usize) -> TransactionPriority {
        match self {
            Self::EncodedLength => encoded_len as TransactionPriority,
            Self::Fixed(priority) => *priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct ValidityConfig {
    /// A nonce more than this far ahead of the expected one is `Unknown`.
    pub max_future_nonces: u64,
    pub priority: PriorityPolicy,
    pub longevity: TransactionLongevity,
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            max_future_nonces: DEFAULT_MAX_FUTURE_NONCES,
            priority: PriorityPolicy::default(),
            longevity: TransactionLongevity::MAX,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default))]
pub struct ExecutiveConfig {
    pub validity: ValidityConfig,
}
