//! Per-row accounting output.

use crate::domain::{Decimal, RowCategory, RowKey, Transfer, TxCategory};
use serde::{Deserialize, Serialize};

/// Cost and gain/loss recorded for one transfer row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row_key: RowKey,
    pub row_category: RowCategory,
    pub tx_category: TxCategory,
    /// Cost basis removed from the ledger by this row.
    pub cost: Decimal,
    /// Realized gain (positive) or loss (negative).
    pub gain_loss: Decimal,
    /// Cost basis of the native asset spent on the network fee.
    pub fee_cost: Decimal,
    /// Fee fiat value minus `fee_cost`.
    pub fee_gain_loss: Decimal,
}

impl RowOutcome {
    pub fn new(row_key: RowKey, row_category: RowCategory, tx_category: TxCategory) -> Self {
        Self {
            row_key,
            row_category,
            tx_category,
            cost: Decimal::zero(),
            gain_loss: Decimal::zero(),
            fee_cost: Decimal::zero(),
            fee_gain_loss: Decimal::zero(),
        }
    }
}

/// An input row returned alongside its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedTransfer {
    pub transfer: Transfer,
    pub outcome: RowOutcome,
}
