//! Free balances, total issuance and transaction fees.
//!
//! Fees are burnt: paying one lowers both the payer's balance and the
//! total issuance.

use alloc::vec::Vec;
use strata_engine::{AccountLookup, Externalities, MakePayment, Origin, StorageMap, StorageValue, System};
use strata_primitives::{AccountId, Address, CodecError, Decode, DispatchError, Encode, Reader};
use crate::indices::Indices;
use crate::Event;

pub type Balance = u64;

pub const FREE_BALANCE: StorageMap<AccountId, Balance> = StorageMap::new(b"Balances FreeBalance");
pub const TOTAL_ISSUANCE: StorageValue<Balance> = StorageValue::new(b"Balances TotalIssuance");
pub const TRANSACTION_BASE_FEE: StorageValue<Balance> = StorageValue::new(b"Balances TransactionBaseFee");
pub const TRANSACTION_BYTE_FEE: StorageValue<Balance> = StorageValue::new(b"Balances TransactionByteFee");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalancesCall {
    Transfer { dest: Address, value: Balance },
}

impl Encode for BalancesCall {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::Transfer { dest: to, value } => {
                dest.push(0);
                to.encode_to(dest);
                value.encode_to(dest);
            }
        }
    }
}

impl Decode for BalancesCall {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::Transfer {
                dest: Decode::decode(input)?,
                value: Decode::decode(input)?,
            }),
            tag => Err(CodecError::InvalidTag { what: "BalancesCall", tag }),
        }
    }
}

impl BalancesCall {
    pub fn dispatch(self, origin: Origin, ext: &mut dyn Externalities) -> Result<(), DispatchError> {
        match self {
            Self::Transfer { dest, value } => {
                let Origin::Signed(from) = origin else {
                    return Err(DispatchError("bad origin: expected signed"));
                };
                Balances::transfer(ext, &from, &dest, value)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalancesEvent {
    /// An account came into existence with this balance.
    NewAccount(AccountId, Balance),
    /// Funds moved: from, to, value.
    Transfer(AccountId, AccountId, Balance),
}

impl Encode for BalancesEvent {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Self::NewAccount(who, balance) => {
                dest.push(0);
                who.encode_to(dest);
                balance.encode_to(dest);
            }
            Self::Transfer(from, to, value) => {
                dest.push(1);
                from.encode_to(dest);
                to.encode_to(dest);
                value.encode_to(dest);
            }
        }
    }
}

impl Decode for BalancesEvent {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Self::NewAccount(Decode::decode(input)?, Decode::decode(input)?)),
            1 => Ok(Self::Transfer(
                Decode::decode(input)?,
                Decode::decode(input)?,
                Decode::decode(input)?,
            )),
            tag => Err(CodecError::InvalidTag { what: "BalancesEvent", tag }),
        }
    }
}

/// The balances module. Also the runtime's fee strategy.
pub struct Balances;

impl Balances {
    pub fn free_balance(ext: &dyn Externalities, who: &AccountId) -> Balance {
        FREE_BALANCE.get(ext, who).unwrap_or_default()
    }

    pub fn total_issuance(ext: &dyn Externalities) -> Balance {
        TOTAL_ISSUANCE.get(ext).unwrap_or_default()
    }

    /// Fee for an extrinsic of `encoded_len` bytes, or `None` on overflow.
    pub fn fee_for(ext: &dyn Externalities, encoded_len: usize) -> Option<Balance> {
        let base = TRANSACTION_BASE_FEE.get(ext).unwrap_or_default();
        let per_byte = TRANSACTION_BYTE_FEE.get(ext).unwrap_or_default();
        per_byte
            .checked_mul(encoded_len as Balance)
            .and_then(|bytes| bytes.checked_add(base))
    }

    pub fn exists(ext: &dyn Externalities, who: &AccountId) -> bool {
        FREE_BALANCE.contains_key(ext, who)
    }

    /// Set a balance, creating the account (and its index) if needed.
    /// Does not touch total issuance.
    pub fn set_free_balance(ext: &mut dyn Externalities, who: &AccountId, balance: Balance) {
        let is_new = !Self::exists(ext, who);
        FREE_BALANCE.insert(ext, who, &balance);
        if is_new {
            Indices::on_new_account(ext, who);
            System::<Event>::new(ext).deposit_event(BalancesEvent::NewAccount(*who, balance).into());
        }
    }

    /// Move `value` from `from` to the account `dest` names.
    pub fn transfer(
        ext: &mut dyn Externalities,
        from: &AccountId,
        dest: &Address,
        value: Balance,
    ) -> Result<(), DispatchError> {
        let to = Indices::lookup(ext, dest).map_err(|_| DispatchError("unknown destination address"))?;

        let from_balance = Self::free_balance(ext, from);
        let new_from = from_balance
            .checked_sub(value)
            .ok_or(DispatchError("balance too low to send value"))?;
        let to_balance = if from == &to { new_from } else { Self::free_balance(ext, &to) };
        let new_to = to_balance
            .checked_add(value)
            .ok_or(DispatchError("destination balance too high to receive value"))?;

        FREE_BALANCE.insert(ext, from, &new_from);
        Self::set_free_balance(ext, &to, new_to);

        log::trace!(target: "runtime::balances", "transferred {} units", value);
        System::<Event>::new(ext).deposit_event(BalancesEvent::Transfer(*from, to, value).into());
        Ok(())
    }
}

impl MakePayment for Balances {
    fn make_payment(
        &self,
        ext: &mut dyn Externalities,
        who: &AccountId,
        encoded_len: usize,
    ) -> Result<(), DispatchError> {
        // Paying must never create an account; funding does that.
        if !Self::exists(ext, who) {
            return Err(DispatchError("not enough funds for transaction fee"));
        }
        let fee = Self::fee_for(ext, encoded_len).ok_or(DispatchError("fee overflow"))?;
        let balance = Self::free_balance(ext, who);
        let remaining = balance
            .checked_sub(fee)
            .ok_or(DispatchError("not enough funds for transaction fee"))?;
        FREE_BALANCE.insert(ext, who, &remaining);
        TOTAL_ISSUANCE.mutate(ext, |issuance| *issuance = issuance.saturating_sub(fee));
        log::trace!(target: "runtime::balances", "charged fee {} for {} bytes", fee, encoded_len);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_engine::TestExternalities;

    const ALICE: AccountId = [1u8; 32];
    const BOB: AccountId = [2u8; 32];

    fn ext_with(balances: &[(AccountId, Balance)], base_fee: Balance, byte_fee: Balance) -> TestExternalities {
        let mut ext = TestExternalities::default();
        let mut issuance = 0;
        for (who, balance) in balances {
            Balances::set_free_balance(&mut ext, who, *balance);
            issuance += balance;
        }
        TOTAL_ISSUANCE.put(&mut ext, &issuance);
        TRANSACTION_BASE_FEE.put(&mut ext, &base_fee);
        TRANSACTION_BYTE_FEE.put(&mut ext, &byte_fee);
        ext
    }

    #[test]
    fn test_transfer_moves_funds() {
        let mut ext = ext_with(&[(ALICE, 100)], 0, 0);
        Balances::transfer(&mut ext, &ALICE, &Address::Id(BOB), 30).unwrap();
        assert_eq!(Balances::free_balance(&ext, &ALICE), 70);
        assert_eq!(Balances::free_balance(&ext, &BOB), 30);
        assert_eq!(Balances::total_issuance(&ext), 100);
    }

    #[test]
    fn test_transfer_to_new_account_assigns_index() {
        let mut ext = ext_with(&[(ALICE, 100)], 0, 0);
        assert_eq!(Indices::next_enum_index(&ext), 1);
        Balances::transfer(&mut ext, &ALICE, &Address::Id(BOB), 1).unwrap();
        assert_eq!(Indices::lookup_index(&ext, 1), Some(BOB));

        // Index addresses work once assigned.
        Balances::transfer(&mut ext, &ALICE, &Address::Index(1), 1).unwrap();
        assert_eq!(Balances::free_balance(&ext, &BOB), 2);
    }

    #[test]
    fn test_transfer_errors() {
        let mut ext = ext_with(&[(ALICE, 100), (BOB, Balance::MAX)], 0, 0);
        assert_eq!(
            Balances::transfer(&mut ext, &ALICE, &Address::Id(BOB), 101),
            Err(DispatchError("balance too low to send value"))
        );
        assert_eq!(
            Balances::transfer(&mut ext, &ALICE, &Address::Id(BOB), 1),
            Err(DispatchError("destination balance too high to receive value"))
        );
        assert_eq!(
            Balances::transfer(&mut ext, &ALICE, &Address::Index(77), 1),
            Err(DispatchError("unknown destination address"))
        );
        assert_eq!(Balances::free_balance(&ext, &ALICE), 100);
    }

    #[test]
    fn test_transfer_to_self_is_neutral() {
        let mut ext = ext_with(&[(ALICE, 100)], 0, 0);
        Balances::transfer(&mut ext, &ALICE, &Address::Id(ALICE), 40).unwrap();
        assert_eq!(Balances::free_balance(&ext, &ALICE), 100);
    }

    #[test]
    fn test_transfer_requires_signed_origin() {
        let mut ext = ext_with(&[(ALICE, 100)], 0, 0);
        let call = BalancesCall::Transfer { dest: Address::Id(BOB), value: 1 };
        assert_eq!(
            call.dispatch(Origin::Inherent, &mut ext),
            Err(DispatchError("bad origin: expected signed"))
        );
    }

    #[test]
    fn test_fee_is_burnt() {
        let mut ext = ext_with(&[(ALICE, 100)], 3, 2);
        assert_eq!(Balances::fee_for(&ext, 10), Some(23));
        Balances.make_payment(&mut ext, &ALICE, 10).unwrap();
        assert_eq!(Balances::free_balance(&ext, &ALICE), 77);
        assert_eq!(Balances::total_issuance(&ext), 77);
    }

    #[test]
    fn test_fee_payment_fails_without_funds() {
        let mut ext = ext_with(&[(ALICE, 5)], 3, 2);
        assert!(Balances.make_payment(&mut ext, &ALICE, 10).is_err());
        assert!(Balances.make_payment(&mut ext, &BOB, 0).is_err());
        assert_eq!(Balances::free_balance(&ext, &ALICE), 5);
    }

    #[test]
    fn test_free_fee_still_needs_an_account() {
        let mut ext = ext_with(&[(ALICE, 5)], 0, 0);
        assert_eq!(
            Balances.make_payment(&mut ext, &BOB, 10),
            Err(DispatchError("not enough funds for transaction fee"))
        );
        assert!(!Balances::exists(&ext, &BOB));
        Balances.make_payment(&mut ext, &ALICE, 10).unwrap();
        assert_eq!(Balances::free_balance(&ext, &ALICE), 5);
    }

    #[test]
    fn test_fee_overflow_is_an_error() {
        let mut ext = ext_with(&[(ALICE, 5)], 1, Balance::MAX);
        assert_eq!(Balances::fee_for(&ext, 2), None);
        assert_eq!(
            Balances.make_payment(&mut ext, &ALICE, 2),
            Err(DispatchError("fee overflow"))
        );
    }
}
