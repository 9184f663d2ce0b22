//! Per-asset amounts attached to a send.
//!
//! All arithmetic is on [`Amount`], so nothing here can lose precision or go
//! negative.

use ferry_types::{Amount, AmountUnderflow, AssetAmount, AssetId};

use crate::address::Address;

/// Minimum native amount that must accompany every token output, in the
/// smallest native unit (0.001 of a whole unit).
pub const MIN_UTXO_NATIVE_AMOUNT: u64 = 1_000_000_000_000_000;

/// An insertion-ordered set of asset amounts, at most one entry per asset
/// and never an entry holding zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssetAmounts(Vec<AssetAmount>);

impl AssetAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert the amount for `id`, or remove the entry when `amount` is
    /// `None` or zero.
    ///
    /// Replacing keeps the entry's position; new assets are appended.
    pub fn set(&mut self, id: AssetId, amount: Option<Amount>) {
        let existing = self.0.iter().position(|a| a.id == id);
        match (existing, amount.filter(|a| !a.is_zero())) {
            (Some(index), Some(amount)) => self.0[index].amount = amount,
            (Some(index), None) => {
                self.0.remove(index);
            }
            (None, Some(amount)) => self.0.push(AssetAmount { id, amount }),
            (None, None) => {}
        }
    }

    pub fn get(&self, id: &AssetId) -> Option<&Amount> {
        self.0.iter().find(|a| &a.id == id).map(|a| &a.amount)
    }

    pub fn as_slice(&self) -> &[AssetAmount] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetAmount> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Native amount split from token amounts, the shape the node API expects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionAssetAmounts {
    pub native_amount: Amount,
    pub token_amounts: Vec<AssetAmount>,
}

/// Split `assets` into the native amount and the token amounts.
///
/// Every token output needs [`MIN_UTXO_NATIVE_AMOUNT`] of the native asset
/// alongside it, so the native amount is raised to cover that when lower.
pub fn aggregate(assets: &[AssetAmount]) -> TransactionAssetAmounts {
    let native_amount: Amount = assets
        .iter()
        .filter(|a| a.id.is_native())
        .map(|a| &a.amount)
        .sum();
    let token_amounts: Vec<AssetAmount> = assets
        .iter()
        .filter(|a| !a.id.is_native() && !a.amount.is_zero())
        .cloned()
        .collect();

    let dust = &Amount::from(MIN_UTXO_NATIVE_AMOUNT) * token_amounts.len() as u64;

    TransactionAssetAmounts {
        native_amount: native_amount.max(dust),
        token_amounts,
    }
}

/// Spendable part of a balance: `balance - locked`.
pub fn available(balance: &Amount, locked: &Amount) -> Result<Amount, AmountUnderflow> {
    balance.checked_sub(locked)
}

/// Check that `from` holds enough unlocked funds for `assets`.
///
/// Fees are not included; the node accounts for them when building.
pub fn ensure_spendable(from: &Address, assets: &[AssetAmount]) -> Result<(), AmountUnderflow> {
    let totals = aggregate(assets);

    available(&from.balance, &from.locked_balance)?.checked_sub(&totals.native_amount)?;

    for token in &totals.token_amounts {
        let spendable = match from.token_balance(&token.id) {
            Some(holding) => available(&holding.balance, &holding.locked_balance)?,
            None => Amount::zero(),
        };
        spendable.checked_sub(&token.amount)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::TokenBalance;
    use ferry_types::AddressHash;

    fn token(byte: u8) -> AssetId {
        AssetId::parse(&format!("{byte:02x}").repeat(32)).unwrap()
    }

    #[test]
    fn setting_twice_keeps_one_entry() {
        let mut assets = AssetAmounts::new();
        assets.set(token(1), Some(Amount::from(5u64)));
        assets.set(token(1), Some(Amount::from(5u64)));
        assert_eq!(assets.len(), 1);
        assert_eq!(assets.get(&token(1)), Some(&Amount::from(5u64)));
    }

    #[test]
    fn none_removes_entry() {
        let mut assets = AssetAmounts::new();
        assets.set(token(1), Some(Amount::from(5u64)));
        assets.set(token(1), None);
        assert!(assets.is_empty());
        assert_eq!(assets.get(&token(1)), None);
    }

    #[test]
    fn zero_removes_entry_and_is_never_stored() {
        let mut assets = AssetAmounts::new();
        assets.set(token(1), Some(Amount::zero()));
        assert!(assets.is_empty());

        assets.set(token(1), Some(Amount::from(3u64)));
        assets.set(token(1), Some(Amount::zero()));
        assert!(assets.is_empty());
    }

    #[test]
    fn replace_keeps_position_and_new_entries_append() {
        let mut assets = AssetAmounts::new();
        assets.set(token(1), Some(Amount::from(1u64)));
        assets.set(token(2), Some(Amount::from(2u64)));
        assets.set(token(3), Some(Amount::from(3u64)));
        assets.set(token(1), Some(Amount::from(10u64)));
        assets.set(token(2), None);
        assets.set(token(4), Some(Amount::from(4u64)));

        let ids: Vec<_> = assets.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids, vec![token(1), token(3), token(4)]);
        assert_eq!(assets.get(&token(1)), Some(&Amount::from(10u64)));
    }

    #[test]
    fn aggregate_native_only() {
        let assets = vec![AssetAmount::new(AssetId::native(), 10u64)];
        let totals = aggregate(&assets);
        assert_eq!(totals.native_amount, Amount::from(10u64));
        assert!(totals.token_amounts.is_empty());
    }

    #[test]
    fn aggregate_tops_up_native_for_token_outputs() {
        let assets = vec![
            AssetAmount::new(token(1), 7u64),
            AssetAmount::new(token(2), 9u64),
        ];
        let totals = aggregate(&assets);
        assert_eq!(
            totals.native_amount,
            Amount::from(2 * MIN_UTXO_NATIVE_AMOUNT)
        );
        assert_eq!(totals.token_amounts, assets);
    }

    #[test]
    fn aggregate_keeps_native_above_dust_minimum() {
        let native = Amount::from(5 * MIN_UTXO_NATIVE_AMOUNT);
        let assets = vec![
            AssetAmount::new(token(1), 7u64),
            AssetAmount {
                id: AssetId::native(),
                amount: native.clone(),
            },
        ];
        let totals = aggregate(&assets);
        assert_eq!(totals.native_amount, native);
        assert_eq!(totals.token_amounts.len(), 1);
    }

    #[test]
    fn available_underflows_when_locked_exceeds_balance() {
        assert!(available(&Amount::from(5u64), &Amount::from(6u64)).is_err());
        assert_eq!(
            available(&Amount::from(10u64), &Amount::from(4u64)).unwrap(),
            Amount::from(6u64)
        );
    }

    fn address(balance: u64, locked: u64) -> Address {
        let mut a = Address::new(AddressHash::parse("addr1").unwrap(), "pk1");
        a.balance = Amount::from(balance);
        a.locked_balance = Amount::from(locked);
        a
    }

    #[test]
    fn spend_within_unlocked_balance_is_accepted() {
        let from = address(100, 20);
        let assets = vec![AssetAmount::new(AssetId::native(), 80u64)];
        assert!(ensure_spendable(&from, &assets).is_ok());
    }

    #[test]
    fn spend_above_unlocked_balance_underflows() {
        let from = address(100, 20);
        let assets = vec![AssetAmount::new(AssetId::native(), 81u64)];
        let err = ensure_spendable(&from, &assets).unwrap_err();
        assert_eq!(err.minuend, Amount::from(80u64));
        assert_eq!(err.subtrahend, Amount::from(81u64));
    }

    #[test]
    fn unknown_token_underflows() {
        let from = address(10 * MIN_UTXO_NATIVE_AMOUNT, 0);
        let assets = vec![AssetAmount::new(token(9), 1u64)];
        assert!(ensure_spendable(&from, &assets).is_err());
    }

    #[test]
    fn held_token_within_balance_is_accepted() {
        let mut from = address(10 * MIN_UTXO_NATIVE_AMOUNT, 0);
        from.tokens.push(TokenBalance {
            id: token(9),
            balance: Amount::from(50u64),
            locked_balance: Amount::from(10u64),
        });
        assert!(ensure_spendable(&from, &[AssetAmount::new(token(9), 40u64)]).is_ok());
        assert!(ensure_spendable(&from, &[AssetAmount::new(token(9), 41u64)]).is_err());
    }
}
