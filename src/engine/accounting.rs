//! Accounting engine: a sequential fold of classified transactions into the
//! ledger, producing per-row cost and gain/loss.

use super::classifier::{classify, ClassificationError};
use super::{GainSummary, Profile};
use crate::domain::{
    prepare_transactions, AnnotatedTransfer, ContractId, Decimal, KeyedTransfer, RowCategory,
    RowKey, RowOutcome, TokenId, Transfer, TxCategory, TxGroup, TxHash,
};
use crate::ledger::{Holdings, Ledger, LedgerError, Token};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use thiserror::Error;

/// A non-fatal problem found while processing. Affected rows keep zero or
/// best-effort figures and need manual review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub tx_hash: TxHash,
    pub row: Option<RowKey>,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("{0}")]
    Classification(ClassificationError),

    #[error("acquired {amount} {token} without a price, recorded at zero cost")]
    UnpricedAcquisition { token: TokenId, amount: Decimal },

    #[error("withdrew {excess} {token} more than was deposited")]
    OverWithdrawal { token: TokenId, excess: Decimal },

    #[error("fee of {fee} {token} has no fiat value, counted as zero")]
    MissingFeeValue { token: TokenId, fee: Decimal },
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct AccountingReport {
    pub ledger: Ledger,
    /// Input rows in processing order, each with its outcome.
    pub rows: Vec<AnnotatedTransfer>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AccountingReport {
    pub fn total_cost(&self) -> Decimal {
        self.ledger.total_cost()
    }

    pub fn holdings(&self) -> Holdings {
        self.ledger.holdings()
    }

    pub fn gain_summary(&self) -> GainSummary {
        GainSummary::from_rows(&self.rows)
    }

    pub fn outcome(&self, row: &RowKey) -> Option<&RowOutcome> {
        self.rows
            .iter()
            .map(|r| &r.outcome)
            .find(|o| &o.row_key == row)
    }

    pub fn error_rows(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.outcome.row_category == RowCategory::Error)
            .count()
    }
}

/// Owns the ledger for the duration of a run.
#[derive(Debug)]
pub struct Accountant {
    ledger: Ledger,
    profile: Profile,
    diagnostics: Vec<Diagnostic>,
}

impl Accountant {
    pub fn new(profile: Profile) -> Self {
        Self::with_ledger(profile, Ledger::new())
    }

    /// Continue from an existing ledger state.
    pub fn with_ledger(profile: Profile, ledger: Ledger) -> Self {
        Self {
            ledger,
            profile,
            diagnostics: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Sort, group and process every transfer. Stops at the first ledger
    /// invariant violation.
    pub fn run(mut self, transfers: Vec<Transfer>) -> Result<AccountingReport, LedgerError> {
        let groups = prepare_transactions(transfers);
        let mut rows = Vec::new();

        for group in &groups {
            let outcomes = self.process_transaction(group).inspect_err(|e| {
                tracing::error!(tx = %group.tx_hash, error = %e, "ledger invariant violated");
            })?;
            rows.extend(
                group
                    .rows
                    .iter()
                    .zip(outcomes)
                    .map(|(row, outcome)| AnnotatedTransfer {
                        transfer: row.transfer.clone(),
                        outcome,
                    }),
            );
        }

        tracing::info!(
            transactions = groups.len(),
            rows = rows.len(),
            diagnostics = self.diagnostics.len(),
            total_cost = %self.ledger.total_cost(),
            "accounting run complete"
        );

        Ok(AccountingReport {
            ledger: self.ledger,
            rows,
            diagnostics: self.diagnostics,
        })
    }

    /// Classify one transaction and apply it to the ledger. Returns one outcome
    /// per row, aligned with `group.rows`.
    pub fn process_transaction(&mut self, group: &TxGroup) -> Result<Vec<RowOutcome>, LedgerError> {
        let classification = classify(group, &self.ledger, &self.profile);
        for issue in &classification.issues {
            self.diagnose(
                &group.tx_hash,
                issue.row.clone(),
                DiagnosticKind::Classification(issue.error.clone()),
            );
        }

        let category = classification.tx_category;
        let contract = classification.summary.and_then(|s| s.contract);
        let mut outcomes: Vec<RowOutcome> = group
            .rows
            .iter()
            .zip(&classification.row_categories)
            .map(|(row, rc)| RowOutcome::new(row.key.clone(), *rc, category))
            .collect();

        let tx = TxTransaction {
            group,
            categories: &classification.row_categories,
        };

        self.charge_fees(&tx, &mut outcomes)?;

        for i in tx.indices(RowCategory::InitialDeposit) {
            self.buy_at_quote(&tx.group.rows[i])?;
        }

        for i in tx.indices(RowCategory::PaymentIn) {
            let row = &tx.group.rows[i].transfer;
            self.buy_at_quote(&tx.group.rows[i])?;
            outcomes[i].gain_loss = row.fiat_value().unwrap_or_default();
        }

        for i in tx.indices(RowCategory::PaymentOut) {
            let row = &tx.group.rows[i].transfer;
            let removed = self.ledger.remove_token(&row.token, row.amount_or_zero())?;
            outcomes[i].cost = removed.cost();
            outcomes[i].gain_loss = row.fiat_value().unwrap_or_default() - removed.cost();
        }

        for i in tx.indices(RowCategory::ContractDepositOut) {
            let row = &tx.group.rows[i].transfer;
            let target = contract.as_ref().ok_or_else(|| LedgerError::MissingContract {
                tx: group.tx_hash.clone(),
            })?;
            self.ledger.deposit(target, &row.token, row.amount_or_zero())?;
        }

        for i in tx.indices(RowCategory::ContractWithdrawIn) {
            outcomes[i].gain_loss = self.withdraw_from_contract(&tx.group.rows[i])?;
        }

        match category {
            TxCategory::Swap => self.swap(&tx, &mut outcomes)?,
            TxCategory::LiquidDeposit => self.liquid_deposit(&tx)?,
            TxCategory::LiquidWithdraw => self.liquid_withdraw(&tx, &mut outcomes)?,
            _ => {}
        }

        Ok(outcomes)
    }

    fn diagnose(&mut self, tx_hash: &TxHash, row: Option<RowKey>, kind: DiagnosticKind) {
        match &row {
            Some(row) => tracing::warn!(tx = %tx_hash, row = %row, "{}", kind),
            None => tracing::warn!(tx = %tx_hash, "{}", kind),
        }
        self.diagnostics.push(Diagnostic {
            tx_hash: tx_hash.clone(),
            row,
            kind,
        });
    }

    /// Network fees are paid from the native-token holding before anything else.
    fn charge_fees(
        &mut self,
        tx: &TxTransaction<'_>,
        outcomes: &mut [RowOutcome],
    ) -> Result<(), LedgerError> {
        let native = self.profile.native_token().clone();
        for (i, row) in tx.group.rows.iter().enumerate() {
            let t = &row.transfer;
            if !self.profile.is_outgoing(t) || !t.fee_native.is_positive() {
                continue;
            }
            let fee = self.ledger.remove_token(&native, t.fee_native)?;
            let fee_value = match t.fee_value {
                Some(value) => value,
                None => {
                    self.diagnose(
                        &tx.group.tx_hash,
                        Some(row.key.clone()),
                        DiagnosticKind::MissingFeeValue {
                            token: native.clone(),
                            fee: t.fee_native,
                        },
                    );
                    Decimal::zero()
                }
            };
            outcomes[i].fee_cost = fee.cost();
            outcomes[i].fee_gain_loss = fee_value - fee.cost();
        }
        Ok(())
    }

    /// Buy the whole row at its quoted price, or at zero cost if it has none.
    fn buy_at_quote(&mut self, row: &KeyedTransfer) -> Result<(), LedgerError> {
        let amount = row.transfer.amount_or_zero();
        self.buy_amount_at_quote(row, amount)
    }

    fn buy_amount_at_quote(&mut self, row: &KeyedTransfer, amount: Decimal) -> Result<(), LedgerError> {
        let t = &row.transfer;
        let price = match t.quoted_price() {
            Some(price) => price,
            None => {
                self.diagnose(
                    &t.tx_hash,
                    Some(row.key.clone()),
                    DiagnosticKind::UnpricedAcquisition {
                        token: t.token.clone(),
                        amount,
                    },
                );
                Decimal::zero()
            }
        };
        self.ledger.add_buy(&t.token, amount, price)
    }

    /// Returns the gain booked on any excess over the recorded deposit.
    fn withdraw_from_contract(&mut self, row: &KeyedTransfer) -> Result<Decimal, LedgerError> {
        let t = &row.transfer;
        let contract: &ContractId = &t.from;
        let received = t.amount_or_zero();
        let deposited = self.ledger.deposited_amount(contract, &t.token);

        let to_withdraw = received.min(deposited);
        if to_withdraw.is_positive() {
            let returned = self.ledger.withdraw_from_contract(contract, &t.token, to_withdraw)?;
            self.ledger.add_token(returned)?;
        }
        self.book_excess(row, received - deposited)
    }

    /// Model an over-withdrawal as a fresh buy at the quoted price.
    fn book_excess(&mut self, row: &KeyedTransfer, excess: Decimal) -> Result<Decimal, LedgerError> {
        if !excess.is_positive() || excess.is_dust() {
            return Ok(Decimal::zero());
        }
        let t = &row.transfer;
        self.diagnose(
            &t.tx_hash,
            Some(row.key.clone()),
            DiagnosticKind::OverWithdrawal {
                token: t.token.clone(),
                excess,
            },
        );
        self.buy_amount_at_quote(row, excess)?;
        Ok(excess * t.quoted_price().unwrap_or_default())
    }

    fn swap(&mut self, tx: &TxTransaction<'_>, outcomes: &mut [RowOutcome]) -> Result<(), LedgerError> {
        let incoming = tx.indices(RowCategory::SwapIn);
        let outgoing = tx.indices(RowCategory::SwapOut);
        tx.require_legs(TxCategory::Swap, &incoming, &outgoing, |n| n > 0)?;

        for i in outgoing {
            let row = &tx.group.rows[i].transfer;
            let removed = self.ledger.remove_token(&row.token, row.amount_or_zero())?;
            outcomes[i].cost = removed.cost();
            outcomes[i].gain_loss = -removed.cost();
        }
        for i in incoming {
            let row = &tx.group.rows[i];
            self.buy_at_quote(row)?;
            outcomes[i].gain_loss = row.transfer.fiat_value().unwrap_or_default();
        }
        Ok(())
    }

    fn liquid_deposit(&mut self, tx: &TxTransaction<'_>) -> Result<(), LedgerError> {
        let incoming = tx.indices(RowCategory::LiquidDepositIn);
        let outgoing = tx.indices(RowCategory::LiquidDepositOut);
        tx.require_legs(TxCategory::LiquidDeposit, &incoming, &outgoing, |n| n == 1)?;

        let mut wrapped: BTreeMap<TokenId, Token> = BTreeMap::new();
        for i in outgoing {
            let row = &tx.group.rows[i].transfer;
            let removed = self.ledger.remove_token(&row.token, row.amount_or_zero())?;
            match wrapped.entry(row.token.clone()) {
                Entry::Occupied(mut slot) => slot.get_mut().merge(removed)?,
                Entry::Vacant(slot) => {
                    slot.insert(removed);
                }
            }
        }

        let receipt = &tx.group.rows[incoming[0]].transfer;
        self.ledger
            .liquid_deposit(&receipt.token, receipt.amount_or_zero(), wrapped)
    }

    fn liquid_withdraw(
        &mut self,
        tx: &TxTransaction<'_>,
        outcomes: &mut [RowOutcome],
    ) -> Result<(), LedgerError> {
        let incoming = tx.indices(RowCategory::LiquidWithdrawIn);
        let outgoing = tx.indices(RowCategory::LiquidWithdrawOut);
        if outgoing.len() != 1 || incoming.is_empty() {
            return Err(tx.missing_legs(TxCategory::LiquidWithdraw, &incoming, &outgoing));
        }

        let receipt_idx = outgoing[0];
        let receipt = &tx.group.rows[receipt_idx].transfer;
        let mut removed = self
            .ledger
            .remove_token(&receipt.token, receipt.amount_or_zero())?;

        for i in incoming {
            let row = &tx.group.rows[i];
            let t = &row.transfer;
            let received = t.amount_or_zero();
            let wrapped = removed.underlying_amount(&t.token);

            if wrapped.is_positive() {
                let unwrapped = removed.withdraw(&t.token, received.min(wrapped))?;
                self.ledger.add_token(unwrapped)?;
                outcomes[i].gain_loss = self.book_excess(row, received - wrapped)?;
            } else {
                self.buy_at_quote(row)?;
                outcomes[i].gain_loss = t.fiat_value().unwrap_or_default();
            }
        }

        // Whatever is left in the receipt was not returned to us.
        outcomes[receipt_idx].cost = removed.cost();
        outcomes[receipt_idx].gain_loss = -removed.cost();
        Ok(())
    }
}

/// A transaction's rows alongside their categories.
struct TxTransaction<'a> {
    group: &'a TxGroup,
    categories: &'a [RowCategory],
}

impl TxTransaction<'_> {
    fn indices(&self, category: RowCategory) -> Vec<usize> {
        self.categories
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == category)
            .map(|(i, _)| i)
            .collect()
    }

    fn missing_legs(&self, category: TxCategory, incoming: &[usize], outgoing: &[usize]) -> LedgerError {
        LedgerError::MissingLegs {
            tx: self.group.tx_hash.clone(),
            category,
            incoming: incoming.len(),
            outgoing: outgoing.len(),
        }
    }

    /// Both sides need at least one leg; `incoming_ok` constrains the incoming count.
    fn require_legs(
        &self,
        category: TxCategory,
        incoming: &[usize],
        outgoing: &[usize],
        incoming_ok: impl Fn(usize) -> bool,
    ) -> Result<(), LedgerError> {
        if outgoing.is_empty() || !incoming_ok(incoming.len()) {
            return Err(self.missing_legs(category, incoming, outgoing));
        }
        Ok(())
    }
}

/// Serializable view of a diagnostic for reports.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    pub tx_hash: String,
    pub row: Option<String>,
    pub message: String,
}

impl From<&Diagnostic> for DiagnosticRecord {
    fn from(d: &Diagnostic) -> Self {
        Self {
            tx_hash: d.tx_hash.to_string(),
            row: d.row.as_ref().map(RowKey::to_string),
            message: d.kind.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, Timestamp};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn id(s: &str) -> TokenId {
        TokenId::new(s)
    }

    fn profile() -> Profile {
        Profile::new([Address::new("0xme")], Address::new("0xfund"), id("ETH"))
    }

    fn row(hash: &str, ts: i64, from: &str, to: &str, token: &str, amount: &str) -> Transfer {
        Transfer::new(
            TxHash::new(hash),
            Timestamp::new(ts),
            Address::new(from),
            Address::new(to),
            id(token),
            d(amount),
        )
    }

    fn funded(accountant: &mut Accountant, token: &str, amount: &str, price: &str) {
        let groups = prepare_transactions(vec![
            row("0xfund1", 1, "0xfund", "0xme", token, amount).with_price(d(price)),
        ]);
        accountant.process_transaction(&groups[0]).unwrap();
    }

    #[test]
    fn test_fee_is_charged_from_native_holding() {
        let mut acc = Accountant::new(profile());
        funded(&mut acc, "ETH", "1", "1000");

        let groups = prepare_transactions(vec![row("0xpay", 2, "0xme", "0xshop", "ETH", "0.5")
            .with_price(d("1200"))
            .with_method("transfer")
            .with_fee(d("0.01"), Some(d("12")))]);
        let outcomes = acc.process_transaction(&groups[0]).unwrap();

        assert_eq!(outcomes[0].row_category, RowCategory::PaymentOut);
        assert_eq!(outcomes[0].fee_cost, d("10"));
        assert_eq!(outcomes[0].fee_gain_loss, d("2"));
        assert_eq!(outcomes[0].cost, d("500"));
        assert_eq!(outcomes[0].gain_loss, d("100"));
        assert_eq!(acc.ledger().holding(&id("ETH")).unwrap().amount(), d("0.49"));
    }

    #[test]
    fn test_missing_fee_value_counts_as_zero() {
        let mut acc = Accountant::new(profile());
        funded(&mut acc, "ETH", "1", "1000");

        let groups = prepare_transactions(vec![row("0xfee", 2, "0xme", "0xapp", "ETH", "0")
            .with_fee(d("0.1"), None)]);
        let outcomes = acc.process_transaction(&groups[0]).unwrap();

        assert_eq!(outcomes[0].fee_gain_loss, d("-100"));
        assert!(matches!(
            acc.diagnostics()[0].kind,
            DiagnosticKind::MissingFeeValue { .. }
        ));
    }

    #[test]
    fn test_unpriced_payment_in_is_a_zero_cost_buy() {
        let mut acc = Accountant::new(profile());
        let groups = prepare_transactions(vec![row("0xair", 1, "0xdrop", "0xme", "JUNK", "50")]);
        let outcomes = acc.process_transaction(&groups[0]).unwrap();

        assert_eq!(outcomes[0].row_category, RowCategory::PaymentIn);
        assert_eq!(outcomes[0].gain_loss, Decimal::zero());
        assert_eq!(acc.ledger().holding(&id("JUNK")).unwrap().cost(), Decimal::zero());
        assert_eq!(acc.diagnostics().len(), 1);
    }

    #[test]
    fn test_contract_withdraw_excess_is_bought_at_quote() {
        let mut acc = Accountant::new(profile());
        funded(&mut acc, "CVX", "100", "5");

        let deposit = prepare_transactions(vec![
            row("0xdep", 2, "0xme", "0xvault", "CVX", "40").with_method("stake")
        ]);
        acc.process_transaction(&deposit[0]).unwrap();
        assert_eq!(acc.ledger().deposited_amount(&Address::new("0xvault"), &id("CVX")), d("40"));

        let withdraw = prepare_transactions(vec![
            row("0xwd", 3, "0xvault", "0xme", "CVX", "45")
                .with_price(d("6"))
                .with_method("unstake"),
        ]);
        let outcomes = acc.process_transaction(&withdraw[0]).unwrap();

        assert_eq!(outcomes[0].row_category, RowCategory::ContractWithdrawIn);
        assert_eq!(outcomes[0].gain_loss, d("30"));
        assert!(acc.ledger().deposit_record(&Address::new("0xvault")).is_none());
        assert_eq!(acc.ledger().holding(&id("CVX")).unwrap().amount(), d("105"));
        assert_eq!(acc.ledger().total_cost(), d("530"));
    }

    #[test]
    fn test_reward_claim_is_income() {
        let mut acc = Accountant::new(profile());
        let groups = prepare_transactions(vec![
            row("0xclaim", 1, "0xvault", "0xme", "CRV", "10")
                .with_price(d("2"))
                .with_method("getReward"),
        ]);
        let outcomes = acc.process_transaction(&groups[0]).unwrap();
        assert_eq!(outcomes[0].row_category, RowCategory::PaymentIn);
        assert_eq!(outcomes[0].gain_loss, d("20"));
    }

    #[test]
    fn test_liquid_withdraw_unwraps_and_writes_off_the_rest() {
        let mut acc = Accountant::new(profile());
        funded(&mut acc, "ETH", "2", "1000");

        let wrap = prepare_transactions(vec![
            row("0xwrap", 2, "0xme", "0xlido", "ETH", "2"),
            row("0xwrap", 2, "0xlido", "0xme", "stETH", "2"),
        ]);
        let outcomes = acc.process_transaction(&wrap[0]).unwrap();
        assert_eq!(outcomes[0].tx_category, TxCategory::LiquidDeposit);
        assert!(matches!(acc.ledger().holding(&id("stETH")), Some(Token::Composite(_))));

        let unwrap = prepare_transactions(vec![
            row("0xunwrap", 3, "0xme", "0xlido", "stETH", "1"),
            row("0xunwrap", 3, "0xlido", "0xme", "ETH", "0.9"),
        ]);
        let outcomes = acc.process_transaction(&unwrap[0]).unwrap();

        assert_eq!(outcomes[0].row_category, RowCategory::LiquidWithdrawOut);
        assert_eq!(outcomes[1].row_category, RowCategory::LiquidWithdrawIn);
        assert_eq!(outcomes[0].cost, d("100"));
        assert_eq!(outcomes[0].gain_loss, d("-100"));
        assert_eq!(acc.ledger().holding(&id("ETH")).unwrap().amount(), d("0.9"));
        assert_eq!(acc.ledger().total_cost(), d("1900"));
    }

    #[test]
    fn test_liquid_withdraw_of_token_absent_from_receipt_is_a_buy() {
        let mut acc = Accountant::new(profile());
        funded(&mut acc, "ETH", "1", "1000");

        let wrap = prepare_transactions(vec![
            row("0xwrap", 2, "0xme", "0xlido", "ETH", "1"),
            row("0xwrap", 2, "0xlido", "0xme", "stETH", "1"),
        ]);
        acc.process_transaction(&wrap[0]).unwrap();

        let unwrap = prepare_transactions(vec![
            row("0xexit", 3, "0xme", "0xlido", "stETH", "1"),
            row("0xexit", 3, "0xlido", "0xme", "ETH", "1"),
            row("0xexit", 3, "0xlido", "0xme", "LDO", "5").with_price(d("2")),
            row("0xexit", 3, "0xlido", "0xme", "JUNK", "3"),
        ]);
        let outcomes = acc.process_transaction(&unwrap[0]).unwrap();

        assert!(outcomes.iter().all(|o| o.tx_category == TxCategory::LiquidWithdraw));
        assert_eq!(outcomes[0].cost, Decimal::zero());
        assert_eq!(outcomes[1].gain_loss, Decimal::zero());
        assert_eq!(outcomes[2].gain_loss, d("10"));
        assert_eq!(outcomes[3].gain_loss, Decimal::zero());

        let ledger = acc.ledger();
        assert!(ledger.holding(&id("stETH")).is_none());
        assert_eq!(ledger.holding(&id("ETH")).unwrap().cost(), d("1000"));
        assert_eq!(ledger.holding(&id("LDO")).unwrap().cost(), d("10"));
        assert_eq!(ledger.holding(&id("JUNK")).unwrap().amount(), d("3"));
        assert_eq!(ledger.holding(&id("JUNK")).unwrap().cost(), Decimal::zero());

        assert_eq!(acc.diagnostics().len(), 1);
        assert_eq!(acc.diagnostics()[0].row, Some(RowKey("0xexit#3".to_string())));
        assert!(matches!(
            acc.diagnostics()[0].kind,
            DiagnosticKind::UnpricedAcquisition { .. }
        ));
    }

    #[test]
    fn test_liquid_deposit_with_two_receipts_is_fatal() {
        let mut acc = Accountant::new(profile());
        funded(&mut acc, "USDC", "100", "1");

        // The zero-priced row counts toward neither side of the summary
        // but is still categorized as an incoming leg.
        let groups = prepare_transactions(vec![
            row("0xlp", 2, "0xme", "0xpool", "USDC", "50").with_price(d("1")),
            row("0xlp", 2, "0xpool", "0xme", "LP", "1"),
            row("0xlp", 2, "0xpool", "0xme", "BONUS", "1").with_price(d("0")),
        ]);
        let err = acc.process_transaction(&groups[0]).unwrap_err();

        assert_eq!(
            err,
            LedgerError::MissingLegs {
                tx: TxHash::new("0xlp"),
                category: TxCategory::LiquidDeposit,
                incoming: 2,
                outgoing: 1,
            }
        );
        assert_eq!(acc.ledger().holding(&id("USDC")).unwrap().amount(), d("100"));
    }

    #[test]
    fn test_paying_with_an_unheld_token_is_fatal() {
        let mut acc = Accountant::new(profile());
        let groups = prepare_transactions(vec![
            row("0xpay", 1, "0xme", "0xshop", "DAI", "5").with_method("transfer"),
        ]);
        let err = acc.process_transaction(&groups[0]).unwrap_err();
        assert_eq!(err, LedgerError::UnknownHolding { token: id("DAI") });
    }

    #[test]
    fn test_classification_errors_leave_the_ledger_untouched() {
        let mut acc = Accountant::new(profile());
        funded(&mut acc, "USDC", "100", "1");
        let before = acc.ledger().clone();

        let groups = prepare_transactions(vec![
            row("0xodd", 2, "0xme", "0xa", "USDC", "1").with_price(d("1")),
            row("0xodd", 2, "0xme", "0xb", "USDC", "1").with_price(d("1")),
            row("0xodd", 2, "0xc", "0xme", "DAI", "2").with_price(d("1")),
        ]);
        let outcomes = acc.process_transaction(&groups[0]).unwrap();

        assert!(outcomes.iter().all(|o| o.tx_category == TxCategory::Error));
        assert_eq!(acc.ledger(), &before);
        assert_eq!(acc.diagnostics().len(), 1);
    }
}
