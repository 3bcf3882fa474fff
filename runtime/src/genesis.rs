//! Genesis configuration.
//!
//! A [`GenesisConfig`] describes the state of block 0. Under `std` it can be
//! loaded from a JSON chain spec:
//!
//! ```json
//! {
//!   "balances": [[[1, 1, ...], 1000]],
//!   "transaction_base_fee": 1,
//!   "transaction_byte_fee": 0,
//!   "minimum_period": 1
//! }
//! ```

use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use strata_engine::{Externalities, System, SystemEvent};
use strata_primitives::{
    enumerated_trie_root, types::hash_to_hex, AccountId, AccountIndex, Hash, Header, ZERO_HASH,
};
use crate::balances::{Balance, FREE_BALANCE, TOTAL_ISSUANCE, TRANSACTION_BASE_FEE, TRANSACTION_BYTE_FEE};
use crate::indices::{ENUM_LOOKUP, NEXT_ENUM_INDEX};
use crate::timestamp::{Moment, MINIMUM_PERIOD};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenesisError {
    #[error("account {0} is endowed twice")]
    DuplicateAccount(alloc::string::String),
    #[error("total issuance overflows")]
    IssuanceOverflow,
    #[error("more endowed accounts than account indices")]
    TooManyAccounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(default, deny_unknown_fields))]
pub struct GenesisConfig {
    /// Endowed accounts, in index order.
    pub balances: Vec<(AccountId, Balance)>,
    pub transaction_base_fee: Balance,
    pub transaction_byte_fee: Balance,
    pub minimum_period: Moment,
}

impl GenesisConfig {
    /// Write genesis state into `ext` and return the genesis header.
    ///
    /// The header commits to the endowed state. Its hash is then recorded
    /// as the hash of block 0, which block 1 must name as its parent.
    pub fn build_storage(&self, ext: &mut dyn Externalities) -> Result<Header, GenesisError> {
        let mut seen = BTreeSet::new();
        let mut issuance: Balance = 0;
        for (who, balance) in &self.balances {
            if !seen.insert(*who) {
                return Err(GenesisError::DuplicateAccount(hash_to_hex(who)));
            }
            issuance = issuance.checked_add(*balance).ok_or(GenesisError::IssuanceOverflow)?;
        }

        // Written directly: genesis emits no events.
        for (position, (who, balance)) in self.balances.iter().enumerate() {
            let index = AccountIndex::try_from(position).map_err(|_| GenesisError::TooManyAccounts)?;
            FREE_BALANCE.insert(ext, who, balance);
            ENUM_LOOKUP.insert(ext, &index, who);
        }
        let next_index =
            AccountIndex::try_from(self.balances.len()).map_err(|_| GenesisError::TooManyAccounts)?;
        NEXT_ENUM_INDEX.put(ext, &next_index);
        TOTAL_ISSUANCE.put(ext, &issuance);
        TRANSACTION_BASE_FEE.put(ext, &self.transaction_base_fee);
        TRANSACTION_BYTE_FEE.put(ext, &self.transaction_byte_fee);
        MINIMUM_PERIOD.put(ext, &self.minimum_period);

        let header = Header {
            parent_hash: ZERO_HASH,
            number: 0,
            state_root: ext.storage_root(),
            extrinsics_root: enumerated_trie_root(Vec::<Vec<u8>>::new()),
            digest: Default::default(),
        };
        let genesis_hash: Hash = header.hash();
        System::<SystemEvent>::new(ext).record_block_hash(0, &genesis_hash);

        log::info!(
            target: "runtime::genesis",
            "built genesis with {} accounts, hash {}",
            self.balances.len(),
            hash_to_hex(&genesis_hash),
        );
        Ok(header)
    }

    /// Build genesis into fresh in-memory externalities and commit it.
    pub fn build_externalities(&self) -> Result<(strata_engine::TestExternalities, Header), GenesisError> {
        let mut ext = strata_engine::TestExternalities::default();
        let header = self.build_storage(&mut ext)?;
        ext.commit();
        Ok((ext, header))
    }
}
