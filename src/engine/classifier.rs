//! Transaction and row classification.
//!
//! Classification is a pure function of one transaction's rows, the wallet
//! [`Profile`] and a read-only view of the [`Ledger`]. Some categories (liquid
//! withdraw vs. deposit, contract withdraw vs. payment) can only be told apart
//! by looking at what the ledger currently holds.

use super::Profile;
use crate::domain::{ContractId, KeyedTransfer, RowCategory, RowKey, Transfer, TxCategory, TxGroup, TxHash};
use crate::ledger::Ledger;
use std::collections::BTreeSet;
use thiserror::Error;

/// Why a transaction or row could not be classified. Never fatal: the affected
/// rows are flagged and left for manual review.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("multiple method names: {}", .0.join(", "))]
    MultipleMethods(Vec<String>),

    #[error("multiple candidate contracts: {}", .0.join(", "))]
    MultipleContracts(Vec<String>),

    #[error("rows span multiple platforms: {}", .0.join(", "))]
    MixedPlatforms(Vec<String>),

    #[error("swap with {0} priced outgoing legs")]
    MultiplePricedOutgoing(usize),

    #[error(
        "no rule for {incoming} incoming ({priced_in} priced) and {outgoing} outgoing ({priced_out} priced) rows"
    )]
    NoMatchingRule {
        incoming: usize,
        outgoing: usize,
        priced_in: usize,
        priced_out: usize,
    },

    #[error("transaction could not be classified")]
    UnclassifiedTransaction,

    #[error("expected an {expected} row in a {category} transaction")]
    DirectionMismatch {
        category: TxCategory,
        expected: &'static str,
    },

    #[error("swap leg without positive fiat value")]
    UnpricedSwapLeg,

    #[error("non-NFT row without an amount")]
    MissingAmount,

    #[error("NFT row is neither incoming nor outgoing")]
    NftWithoutDirection,

    #[error("contract deposit without a target contract")]
    MissingContract,
}

/// A classification problem, attached to a row when it concerns one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationIssue {
    pub row: Option<RowKey>,
    pub error: ClassificationError,
}

/// Counts and call context of one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSummary {
    pub tx_hash: TxHash,
    pub method: Option<String>,
    /// Contract the method was called on (or the exchange venue).
    pub contract: Option<ContractId>,
    pub platform: String,
    pub priced_in: usize,
    pub priced_out: usize,
    pub unpriced_in: usize,
    pub unpriced_out: usize,
}

impl TxSummary {
    pub fn from_rows(
        tx_hash: &TxHash,
        rows: &[KeyedTransfer],
        profile: &Profile,
    ) -> Result<Self, ClassificationError> {
        let platforms: BTreeSet<&str> = rows
            .iter()
            .map(|r| r.transfer.platform.as_str())
            .collect();
        if platforms.len() > 1 {
            return Err(ClassificationError::MixedPlatforms(
                platforms.into_iter().map(str::to_string).collect(),
            ));
        }
        let platform = platforms.into_iter().next().unwrap_or_default().to_string();
        let on_exchange = profile.is_exchange(&platform);

        let method_rows: Vec<&Transfer> = rows
            .iter()
            .map(|r| &r.transfer)
            .filter(|t| t.method.as_deref().is_some_and(|m| !m.trim().is_empty()))
            .collect();

        let mut methods: Vec<String> = method_rows
            .iter()
            .filter_map(|t| t.method.as_deref())
            .map(|m| m.trim().to_string())
            .collect();
        if on_exchange {
            // Exchange exports repeat the same method on every row.
            methods.sort();
            methods.dedup();
        }
        let method = match methods.len() {
            0 => None,
            1 => methods.pop(),
            _ => return Err(ClassificationError::MultipleMethods(methods)),
        };

        let contract = if on_exchange {
            Some(ContractId::new(&platform))
        } else {
            match method_rows.as_slice() {
                [] => None,
                [only] => Some(only.to.clone()),
                many => {
                    return Err(ClassificationError::MultipleContracts(
                        many.iter().map(|t| t.to.to_string()).collect(),
                    ))
                }
            }
        };

        let mut summary = TxSummary {
            tx_hash: tx_hash.clone(),
            method,
            contract,
            platform,
            priced_in: 0,
            priced_out: 0,
            unpriced_in: 0,
            unpriced_out: 0,
        };
        for row in rows {
            let t = &row.transfer;
            let (incoming, outgoing) = (profile.is_incoming(t), profile.is_outgoing(t));
            if t.is_priced() {
                summary.priced_in += incoming as usize;
                summary.priced_out += outgoing as usize;
            } else if t.is_unpriced() {
                summary.unpriced_in += incoming as usize;
                summary.unpriced_out += outgoing as usize;
            }
        }
        Ok(summary)
    }

    pub fn incoming(&self) -> usize {
        self.priced_in + self.unpriced_in
    }

    pub fn outgoing(&self) -> usize {
        self.priced_out + self.unpriced_out
    }

    fn method_is_transfer(&self) -> bool {
        self.method
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("transfer"))
    }

    /// True if the method name mentions a reward claim.
    pub fn is_reward_claim(&self) -> bool {
        self.method
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains("reward"))
    }

    /// Decide the transaction category. First matching rule wins.
    pub fn categorize(
        &self,
        rows: &[KeyedTransfer],
        ledger: &Ledger,
        profile: &Profile,
    ) -> Result<TxCategory, ClassificationError> {
        let (n_in, n_out) = (self.incoming(), self.outgoing());

        if n_in == 0 && n_out == 0 {
            return Ok(TxCategory::FeeOnly);
        }
        if self.method.is_none() && n_in > 0 && n_out == 0 {
            return Ok(TxCategory::TransferIn);
        }
        if n_in == 0 && n_out > 0 {
            return Ok(if self.method_is_transfer() {
                TxCategory::TransferOut
            } else {
                TxCategory::ContractDeposit
            });
        }
        if n_in > 0 && n_out == 0 {
            return Ok(if self.method_is_transfer() {
                TxCategory::TransferIn
            } else {
                TxCategory::ContractWithdraw
            });
        }
        if self.priced_in == 1 && self.priced_out > 0 {
            if self.priced_out > 1 {
                return Err(ClassificationError::MultiplePricedOutgoing(self.priced_out));
            }
            return Ok(TxCategory::Swap);
        }
        if n_out == 1 && self.unpriced_out == 1 && (n_in > 1 || self.priced_in > 0) {
            return Ok(TxCategory::LiquidWithdraw);
        }
        if n_out == 1 && self.unpriced_out == 1 && n_in == 1 && self.unpriced_in == 1 {
            return Ok(if unwraps_held_position(rows, ledger, profile) {
                TxCategory::LiquidWithdraw
            } else {
                TxCategory::LiquidDeposit
            });
        }
        if n_in == 1 && self.unpriced_in == 1 && n_out > 0 {
            return Ok(TxCategory::LiquidDeposit);
        }

        Err(ClassificationError::NoMatchingRule {
            incoming: n_in,
            outgoing: n_out,
            priced_in: self.priced_in,
            priced_out: self.priced_out,
        })
    }
}

/// One unpriced token out, one unpriced token in: is the incoming token already
/// wrapped inside our position of the outgoing one?
fn unwraps_held_position(rows: &[KeyedTransfer], ledger: &Ledger, profile: &Profile) -> bool {
    let find = |incoming: bool| {
        rows.iter().map(|r| &r.transfer).find(|t| {
            t.is_unpriced()
                && if incoming {
                    profile.is_incoming(t)
                } else {
                    profile.is_outgoing(t)
                }
        })
    };
    match (find(true), find(false)) {
        (Some(received), Some(sent)) => ledger
            .holding(&sent.token)
            .is_some_and(|held| held.underlying_amount(&received.token).is_positive()),
        _ => false,
    }
}

/// Categories for one transaction and each of its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub tx_category: TxCategory,
    pub summary: Option<TxSummary>,
    /// Aligned with the group's rows.
    pub row_categories: Vec<RowCategory>,
    pub issues: Vec<ClassificationIssue>,
}

/// Classify a transaction against the current ledger. Does not mutate anything.
pub fn classify(group: &TxGroup, ledger: &Ledger, profile: &Profile) -> Classification {
    let mut issues = Vec::new();

    let summary = match TxSummary::from_rows(&group.tx_hash, &group.rows, profile) {
        Ok(summary) => Some(summary),
        Err(error) => {
            issues.push(ClassificationIssue { row: None, error });
            None
        }
    };

    let tx_category = match &summary {
        Some(s) => s.categorize(&group.rows, ledger, profile).unwrap_or_else(|error| {
            issues.push(ClassificationIssue { row: None, error });
            TxCategory::Error
        }),
        None => TxCategory::Error,
    };

    let row_categories = group
        .rows
        .iter()
        .map(|row| {
            classify_row(&row.transfer, tx_category, summary.as_ref(), ledger, profile)
                .unwrap_or_else(|error| {
                    // A failed transaction is already reported once as a whole.
                    if tx_category != TxCategory::Error {
                        issues.push(ClassificationIssue {
                            row: Some(row.key.clone()),
                            error,
                        });
                    }
                    RowCategory::Error
                })
        })
        .collect();

    tracing::debug!(tx = %group.tx_hash, category = %tx_category, "classified transaction");

    Classification {
        tx_category,
        summary,
        row_categories,
        issues,
    }
}

/// Categorize one row given its transaction's category.
pub fn classify_row(
    transfer: &Transfer,
    category: TxCategory,
    summary: Option<&TxSummary>,
    ledger: &Ledger,
    profile: &Profile,
) -> Result<RowCategory, ClassificationError> {
    let incoming = profile.is_incoming(transfer);
    let outgoing = profile.is_outgoing(transfer);

    if transfer.is_zero_amount() {
        return Ok(RowCategory::NoTransfer);
    }
    if transfer.is_nft() {
        return if incoming {
            Ok(RowCategory::NftIn)
        } else if outgoing {
            Ok(RowCategory::NftOut)
        } else {
            Err(ClassificationError::NftWithoutDirection)
        };
    }
    if transfer.amount.is_none() {
        return Err(ClassificationError::MissingAmount);
    }

    let expect = |ok: bool, expected: &'static str| {
        if ok {
            Ok(())
        } else {
            Err(ClassificationError::DirectionMismatch { category, expected })
        }
    };

    match category {
        TxCategory::TransferIn => {
            expect(incoming, "incoming")?;
            if profile.is_funding(&transfer.from) {
                Ok(RowCategory::InitialDeposit)
            } else if profile.is_bridge(&transfer.from) {
                Ok(RowCategory::InternalTransferIn)
            } else {
                Ok(RowCategory::PaymentIn)
            }
        }
        TxCategory::TransferOut => {
            expect(outgoing, "outgoing")?;
            if profile.is_bridge(&transfer.to) {
                Ok(RowCategory::InternalTransferOut)
            } else {
                Ok(RowCategory::PaymentOut)
            }
        }
        TxCategory::ContractDeposit => {
            expect(outgoing, "outgoing")?;
            if profile.is_bridge(&transfer.to) {
                Ok(RowCategory::InternalTransferOut)
            } else if summary.and_then(|s| s.contract.as_ref()).is_none() {
                Err(ClassificationError::MissingContract)
            } else {
                Ok(RowCategory::ContractDepositOut)
            }
        }
        TxCategory::ContractWithdraw => {
            expect(incoming, "incoming")?;
            if summary.is_some_and(TxSummary::is_reward_claim) {
                Ok(RowCategory::PaymentIn)
            } else if ledger
                .deposited_amount(&transfer.from, &transfer.token)
                .is_positive()
            {
                Ok(RowCategory::ContractWithdrawIn)
            } else {
                Ok(RowCategory::PaymentIn)
            }
        }
        TxCategory::Swap => {
            if !transfer.is_priced() {
                return Err(ClassificationError::UnpricedSwapLeg);
            }
            if incoming {
                Ok(RowCategory::SwapIn)
            } else if outgoing {
                Ok(RowCategory::SwapOut)
            } else {
                Err(ClassificationError::DirectionMismatch {
                    category,
                    expected: "incoming or outgoing",
                })
            }
        }
        TxCategory::LiquidDeposit => {
            if incoming {
                Ok(RowCategory::LiquidDepositIn)
            } else if outgoing {
                Ok(RowCategory::LiquidDepositOut)
            } else {
                Err(ClassificationError::DirectionMismatch {
                    category,
                    expected: "incoming or outgoing",
                })
            }
        }
        TxCategory::LiquidWithdraw => {
            if incoming {
                Ok(RowCategory::LiquidWithdrawIn)
            } else if outgoing {
                Ok(RowCategory::LiquidWithdrawOut)
            } else {
                Err(ClassificationError::DirectionMismatch {
                    category,
                    expected: "incoming or outgoing",
                })
            }
        }
        TxCategory::FeeOnly | TxCategory::Error => Err(ClassificationError::UnclassifiedTransaction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{prepare_transactions, Address, Decimal, Timestamp, TokenId};

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn profile() -> Profile {
        Profile::new([Address::new("0xme")], Address::new("0xfund"), TokenId::new("ETH"))
    }

    fn row(from: &str, to: &str, token: &str, amount: &str) -> Transfer {
        Transfer::new(
            TxHash::new("0xtx"),
            Timestamp::new(100),
            Address::new(from),
            Address::new(to),
            TokenId::new(token),
            d(amount),
        )
    }

    fn group(rows: Vec<Transfer>) -> TxGroup {
        prepare_transactions(rows).remove(0)
    }

    #[test]
    fn test_summary_counts_priced_and_unpriced_by_direction() {
        let g = group(vec![
            row("0xme", "0xpool", "USDC", "10").with_price(d("1")),
            row("0xpool", "0xme", "LP", "3"),
            row("0xpool", "0xme", "DUST", "0"),
        ]);
        let s = TxSummary::from_rows(&g.tx_hash, &g.rows, &profile()).unwrap();
        assert_eq!((s.priced_in, s.priced_out, s.unpriced_in, s.unpriced_out), (0, 1, 1, 0));
    }

    #[test]
    fn test_method_rows_name_the_contract() {
        let g = group(vec![row("0xme", "0xPool", "USDC", "10").with_method("stake")]);
        let s = TxSummary::from_rows(&g.tx_hash, &g.rows, &profile()).unwrap();
        assert_eq!(s.method.as_deref(), Some("stake"));
        assert_eq!(s.contract, Some(ContractId::new("0xpool")));
    }

    #[test]
    fn test_two_methods_are_a_classification_error() {
        let g = group(vec![
            row("0xme", "0xa", "USDC", "1").with_method("stake"),
            row("0xme", "0xb", "DAI", "1").with_method("lock"),
        ]);
        let err = TxSummary::from_rows(&g.tx_hash, &g.rows, &profile()).unwrap_err();
        assert!(matches!(err, ClassificationError::MultipleMethods(_)));
    }

    #[test]
    fn test_exchange_rows_collapse_methods_and_use_venue_as_contract() {
        let p = profile().with_exchange_platforms(["bitstamp".to_string()]);
        let g = group(vec![
            row("0xme", "0xa", "EUR", "1").with_method("trade").with_platform("bitstamp"),
            row("0xb", "0xme", "BTC", "1").with_method("trade").with_platform("bitstamp"),
        ]);
        let s = TxSummary::from_rows(&g.tx_hash, &g.rows, &p).unwrap();
        assert_eq!(s.method.as_deref(), Some("trade"));
        assert_eq!(s.contract, Some(ContractId::new("bitstamp")));
    }

    #[test]
    fn test_mixed_platforms_are_rejected() {
        let g = group(vec![
            row("0xme", "0xa", "USDC", "1").with_platform("ethereum"),
            row("0xa", "0xme", "USDC", "1").with_platform("arbitrum"),
        ]);
        let c = classify(&g, &Ledger::new(), &profile());
        assert_eq!(c.tx_category, TxCategory::Error);
        assert!(c.row_categories.iter().all(|r| *r == RowCategory::Error));
    }

    #[test]
    fn test_zero_amount_rows_are_no_transfer_even_in_error_transactions() {
        let g = group(vec![
            row("0xme", "0xa", "ETH", "0").with_platform("ethereum"),
            row("0xa", "0xme", "USDC", "1").with_platform("arbitrum"),
        ]);
        let c = classify(&g, &Ledger::new(), &profile());
        assert_eq!(c.row_categories[0], RowCategory::NoTransfer);
    }
}
