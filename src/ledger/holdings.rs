//! Flattened holdings snapshot and its market valuation.

use crate::domain::{Decimal, TokenId};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::Ledger;

/// Base-leaf amounts with every composite unwrapped, summed across spot and
/// all deposit contracts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Holdings(BTreeMap<TokenId, Decimal>);

impl Holdings {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let mut acc = BTreeMap::new();
        for token in ledger.spot().values() {
            token.collect_leaves(&mut acc);
        }
        for record in ledger.deposits().values() {
            record.collect_leaves(&mut acc);
        }
        acc.retain(|_, amount: &mut Decimal| !amount.is_dust());
        Holdings(acc)
    }

    pub fn amount(&self, token: &TokenId) -> Decimal {
        self.0.get(token).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TokenId, &Decimal)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value the snapshot at `prices`. Tokens without a price are listed in
    /// [`Valuation::unpriced`] and excluded from the total.
    pub fn valuate(&self, prices: &HashMap<TokenId, Decimal>) -> Valuation {
        let mut by_token = BTreeMap::new();
        let mut unpriced = Vec::new();
        for (token, amount) in &self.0 {
            match prices.get(token) {
                Some(price) => {
                    by_token.insert(token.clone(), *amount * *price);
                }
                None => unpriced.push(token.clone()),
            }
        }
        let total = by_token.values().sum();
        Valuation {
            by_token,
            total,
            unpriced,
        }
    }
}

/// Market value of a holdings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Valuation {
    pub by_token: BTreeMap<TokenId, Decimal>,
    pub total: Decimal,
    pub unpriced: Vec<TokenId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContractId;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn id(s: &str) -> TokenId {
        TokenId::new(s)
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_buy(&id("ETH"), d("3"), d("1000")).unwrap();
        ledger.add_buy(&id("USDC"), d("100"), d("1")).unwrap();

        let eth = ledger.remove_token(&id("ETH"), d("1")).unwrap();
        let mut underlying = BTreeMap::new();
        underlying.insert(id("ETH"), eth);
        ledger.liquid_deposit(&id("stETH"), d("1"), underlying).unwrap();

        ledger
            .deposit(&ContractId::new("0xvault"), &id("ETH"), d("1"))
            .unwrap();
        ledger
            .deposit(&ContractId::new("0xvault"), &id("stETH"), d("0.5"))
            .unwrap();
        ledger
    }

    #[test]
    fn test_unwraps_composites_and_sums_contracts() {
        let holdings = sample_ledger().holdings();
        assert_eq!(holdings.amount(&id("ETH")), d("3"));
        assert_eq!(holdings.amount(&id("USDC")), d("100"));
        assert_eq!(holdings.amount(&id("stETH")), Decimal::zero());
        assert_eq!(holdings.len(), 2);
    }

    #[test]
    fn test_valuation_skips_unpriced_tokens() {
        let holdings = sample_ledger().holdings();
        let mut prices = HashMap::new();
        prices.insert(id("ETH"), d("2000"));
        let valuation = holdings.valuate(&prices);
        assert_eq!(valuation.total, d("6000"));
        assert_eq!(valuation.unpriced, vec![id("USDC")]);
    }
}
