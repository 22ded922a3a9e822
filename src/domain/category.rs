//! Transaction and row categories assigned by the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic category of a whole on-chain transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxCategory {
    /// Only a network fee changed hands.
    FeeOnly,
    TransferIn,
    TransferOut,
    /// Value sent into an external contract that keeps it on our behalf.
    ContractDeposit,
    /// Value received back from an external contract.
    ContractWithdraw,
    Swap,
    /// Collateral wrapped into a receipt token.
    LiquidDeposit,
    /// Receipt token redeemed for its underlying.
    LiquidWithdraw,
    Error,
}

impl TxCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxCategory::FeeOnly => "FEE_ONLY",
            TxCategory::TransferIn => "TRANSFER_IN",
            TxCategory::TransferOut => "TRANSFER_OUT",
            TxCategory::ContractDeposit => "CONTRACT_DEPOSIT",
            TxCategory::ContractWithdraw => "CONTRACT_WITHDRAW",
            TxCategory::Swap => "SWAP",
            TxCategory::LiquidDeposit => "LIQUID_DEPOSIT",
            TxCategory::LiquidWithdraw => "LIQUID_WITHDRAW",
            TxCategory::Error => "ERROR",
        }
    }
}

impl fmt::Display for TxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic category of a single transfer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowCategory {
    NoTransfer,
    InitialDeposit,
    PaymentIn,
    PaymentOut,
    InternalTransferIn,
    InternalTransferOut,
    NftIn,
    NftOut,
    ContractDepositOut,
    ContractWithdrawIn,
    SwapIn,
    SwapOut,
    LiquidDepositIn,
    LiquidDepositOut,
    LiquidWithdrawIn,
    LiquidWithdrawOut,
    Error,
}

impl RowCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowCategory::NoTransfer => "NO_TRANSFER",
            RowCategory::InitialDeposit => "INITIAL_DEPOSIT",
            RowCategory::PaymentIn => "PAYMENT_IN",
            RowCategory::PaymentOut => "PAYMENT_OUT",
            RowCategory::InternalTransferIn => "INTERNAL_TRANSFER_IN",
            RowCategory::InternalTransferOut => "INTERNAL_TRANSFER_OUT",
            RowCategory::NftIn => "NFT_IN",
            RowCategory::NftOut => "NFT_OUT",
            RowCategory::ContractDepositOut => "CONTRACT_DEPOSIT_OUT",
            RowCategory::ContractWithdrawIn => "CONTRACT_WITHDRAW_IN",
            RowCategory::SwapIn => "SWAP_IN",
            RowCategory::SwapOut => "SWAP_OUT",
            RowCategory::LiquidDepositIn => "LIQUID_DEPOSIT_IN",
            RowCategory::LiquidDepositOut => "LIQUID_DEPOSIT_OUT",
            RowCategory::LiquidWithdrawIn => "LIQUID_WITHDRAW_IN",
            RowCategory::LiquidWithdrawOut => "LIQUID_WITHDRAW_OUT",
            RowCategory::Error => "ERROR",
        }
    }
}

impl fmt::Display for RowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
