use crate::domain::{ContractId, Decimal, TokenId};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use super::{BaseToken, CompositeToken, DepositRecord, Holdings, LedgerError, Token};

/// Every currently held value: spot balances plus deposits in external contracts.
///
/// Slots are dropped as soon as their amount falls below `EPS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ledger {
    spot: BTreeMap<TokenId, Token>,
    deposits: BTreeMap<ContractId, DepositRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spot(&self) -> &BTreeMap<TokenId, Token> {
        &self.spot
    }

    pub fn deposits(&self) -> &BTreeMap<ContractId, DepositRecord> {
        &self.deposits
    }

    pub fn holding(&self, token: &TokenId) -> Option<&Token> {
        self.spot.get(token)
    }

    pub fn deposit_record(&self, contract: &ContractId) -> Option<&DepositRecord> {
        self.deposits.get(contract)
    }

    /// Amount of `token` held by `contract`, zero if none.
    pub fn deposited_amount(&self, contract: &ContractId, token: &TokenId) -> Decimal {
        self.deposits
            .get(contract)
            .map(|record| record.deposited_amount(token))
            .unwrap_or_default()
    }

    /// Record an acquisition of `amount` at `unit_cost` as a new spot lot.
    pub fn add_buy(
        &mut self,
        token: &TokenId,
        amount: Decimal,
        unit_cost: Decimal,
    ) -> Result<(), LedgerError> {
        let bought = BaseToken::with_lot(token.clone(), amount, unit_cost)?;
        self.add_token(Token::Base(bought))
    }

    /// Merge an arbitrary token into spot, creating the slot if absent.
    pub fn add_token(&mut self, token: Token) -> Result<(), LedgerError> {
        if token.is_empty() {
            return Ok(());
        }
        match self.spot.entry(token.token_id().clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().merge(token),
            Entry::Vacant(slot) => {
                slot.insert(token);
                Ok(())
            }
        }
    }

    /// Take `amount` of `token` out of spot.
    pub fn remove_token(&mut self, token: &TokenId, amount: Decimal) -> Result<Token, LedgerError> {
        let slot = self
            .spot
            .get_mut(token)
            .ok_or_else(|| LedgerError::UnknownHolding {
                token: token.clone(),
            })?;
        let removed = slot.remove(amount)?;
        if slot.is_empty() {
            self.spot.remove(token);
        }
        Ok(removed)
    }

    /// Move `amount` of `token` from spot into `contract`.
    pub fn deposit(
        &mut self,
        contract: &ContractId,
        token: &TokenId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let moved = self.remove_token(token, amount)?;
        if moved.is_empty() {
            return Ok(());
        }
        self.deposits
            .entry(contract.clone())
            .or_insert_with(|| DepositRecord::new(contract.clone()))
            .deposit(moved)
    }

    /// Take `amount` of `token` back out of `contract`. The caller decides where it goes.
    pub fn withdraw_from_contract(
        &mut self,
        contract: &ContractId,
        token: &TokenId,
        amount: Decimal,
    ) -> Result<Token, LedgerError> {
        let record = self
            .deposits
            .get_mut(contract)
            .ok_or_else(|| LedgerError::UnknownContract {
                contract: contract.clone(),
            })?;
        let removed = record.withdraw(token, amount)?;
        if record.is_empty() {
            self.deposits.remove(contract);
        }
        Ok(removed)
    }

    /// Wrap already-removed `underlying` tokens into `receipt_amount` of a
    /// composite receipt token held in spot.
    pub fn liquid_deposit(
        &mut self,
        receipt: &TokenId,
        receipt_amount: Decimal,
        underlying: BTreeMap<TokenId, Token>,
    ) -> Result<(), LedgerError> {
        let wrapped = CompositeToken::new(receipt.clone(), receipt_amount, underlying);
        self.add_token(Token::Composite(wrapped))
    }

    /// Cost basis of everything held, spot and deposits.
    pub fn total_cost(&self) -> Decimal {
        let spot: Decimal = self.spot.values().map(Token::cost).sum();
        let deposited: Decimal = self.deposits.values().map(DepositRecord::cost).sum();
        spot + deposited
    }

    /// Base-leaf amounts summed across spot and every contract.
    pub fn holdings(&self) -> Holdings {
        Holdings::from_ledger(self)
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spot - base tokens")?;
        for token in self.spot.values().filter(|t| matches!(t, Token::Base(_))) {
            writeln!(f, "  {}", token)?;
        }
        writeln!(f, "Spot - wrapped positions")?;
        for token in self.spot.values().filter(|t| matches!(t, Token::Composite(_))) {
            writeln!(f, "  {}", token)?;
        }
        writeln!(f, "In contracts")?;
        for record in self.deposits.values() {
            write!(f, "  {}", record)?;
        }
        Ok(())
    }
}
