//! Account indices: short numeric aliases for accounts.
//!
//! Every account gets the next free index the first time it is funded.
//! Indices are never reused.

use alloc::vec::Vec;
use strata_engine::{AccountLookup, Externalities, StorageMap, StorageValue, System};
use strata_primitives::{AccountId, AccountIndex, Address, CheckError, CodecError, Decode, Encode, Reader};
use crate::Event;

pub const NEXT_ENUM_INDEX: StorageValue<AccountIndex> = StorageValue::new(b"Indices NextEnumIndex");
pub const ENUM_LOOKUP: StorageMap<AccountIndex, AccountId> = StorageMap::new(b"Indices EnumLookup");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicesEvent {
    /// An account was assigned an index.
    NewAccountIndex(AccountId, AccountIndex),
}

impl Encode for IndicesEvent {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::NewAccountIndex(who, index) => {
                dest.push(0);
                who.encode_to(dest);
                index.encode_to(dest);
            }
        }
    }
}

impl Decode for IndicesEvent {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::NewAccountIndex(Decode::decode(input)?, Decode::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "IndicesEvent", tag }),
        }
    }
}

pub struct Indices;

impl Indices {
    pub fn next_enum_index(ext: &dyn Externalities) -> AccountIndex {
        NEXT_ENUM_INDEX.get(ext).unwrap_or_default()
    }

    pub fn lookup_index(ext: &dyn Externalities, index: AccountIndex) -> Option<AccountId> {
        ENUM_LOOKUP.get(ext, &index)
    }

    /// Assign the next index to `who` and announce it.
    pub fn on_new_account(ext: &mut dyn Externalities, who: &AccountId) -> AccountIndex {
        let index = Self::next_enum_index(ext);
        ENUM_LOOKUP.insert(ext, &index, who);
        NEXT_ENUM_INDEX.put(ext, &index.saturating_add(1));
        log::trace!(target: "runtime::indices", "assigned index {} to new account", index);
        System::<Event>::new(ext).deposit_event(IndicesEvent::NewAccountIndex(*who, index).into());
        index
    }
}

impl AccountLookup for Indices {
    fn lookup(ext: &dyn Externalities, address: &Address) -> Result<AccountId, CheckError> {
        match address {
            Address::Id(id) => Ok(*id),
            Address::Index(index) => {
                Self::lookup_index(ext, *index).ok_or(CheckError::UnknownAccountIndex)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_engine::TestExternalities;

    #[test]
    fn test_indices_are_sequential() {
        let mut ext = TestExternalities::default();
        assert_eq!(Indices::on_new_account(&mut ext, &[1u8; 32]), 0);
        assert_eq!(Indices::on_new_account(&mut ext, &[2u8; 32]), 1);
        assert_eq!(Indices::next_enum_index(&ext), 2);
        assert_eq!(Indices::lookup_index(&ext, 1), Some([2u8; 32]));
    }

    #[test]
    fn test_lookup_resolves_both_address_forms() {
        let mut ext = TestExternalities::default();
        Indices::on_new_account(&mut ext, &[1u8; 32]);

        assert_eq!(Indices::lookup(&ext, &Address::Index(0)), Ok([1u8; 32]));
        assert_eq!(Indices::lookup(&ext, &Address::Id([9u8; 32])), Ok([9u8; 32]));
        assert_eq!(
            Indices::lookup(&ext, &Address::Index(5)),
            Err(CheckError::UnknownAccountIndex)
        );
    }
}
