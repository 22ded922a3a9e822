use crate::domain::{ContractId, Decimal, TokenId};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use super::{LedgerError, Token};

/// Value held by an external contract (staking pool, vault) on our behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositRecord {
    contract: ContractId,
    held: BTreeMap<TokenId, Token>,
}

impl DepositRecord {
    pub fn new(contract: ContractId) -> Self {
        Self {
            contract,
            held: BTreeMap::new(),
        }
    }

    pub fn contract(&self) -> &ContractId {
        &self.contract
    }

    pub fn held(&self) -> &BTreeMap<TokenId, Token> {
        &self.held
    }

    pub fn deposit(&mut self, token: Token) -> Result<(), LedgerError> {
        if token.is_empty() {
            return Ok(());
        }
        match self.held.entry(token.token_id().clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().merge(token),
            Entry::Vacant(slot) => {
                slot.insert(token);
                Ok(())
            }
        }
    }

    /// Amount of `token` held, zero if none.
    pub fn deposited_amount(&self, token: &TokenId) -> Decimal {
        self.held.get(token).map(Token::amount).unwrap_or_default()
    }

    /// Take `amount` of `token` back out. Emptied slots are dropped.
    pub fn withdraw(&mut self, token: &TokenId, amount: Decimal) -> Result<Token, LedgerError> {
        let slot = self
            .held
            .get_mut(token)
            .ok_or_else(|| LedgerError::NotDeposited {
                contract: self.contract.clone(),
                token: token.clone(),
            })?;
        let removed = slot.remove(amount)?;
        if slot.is_empty() {
            self.held.remove(token);
        }
        Ok(removed)
    }

    pub fn cost(&self) -> Decimal {
        self.held.values().map(Token::cost).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn collect_leaves(&self, acc: &mut BTreeMap<TokenId, Decimal>) {
        for token in self.held.values() {
            token.collect_leaves(acc);
        }
    }
}

impl fmt::Display for DepositRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "contract {}:", self.contract)?;
        for token in self.held.values() {
            writeln!(f, "  {}", token)?;
        }
        Ok(())
    }
}
