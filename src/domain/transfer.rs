//! Transfer row: one token movement within an on-chain transaction.

use crate::domain::{Address, Decimal, ExportKind, Timestamp, TokenId, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single normalized, price-enriched token movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Transaction this movement belongs to.
    pub tx_hash: TxHash,
    pub timestamp: Timestamp,
    pub from: Address,
    pub to: Address,
    pub token: TokenId,
    /// Moved amount. Missing for NFT transfers.
    pub amount: Option<Decimal>,
    /// Fiat price per unit, if the token is in the price catalog.
    pub unit_price: Option<Decimal>,
    /// Fiat value of the movement.
    pub value: Option<Decimal>,
    /// Network fee paid in the native asset.
    pub fee_native: Decimal,
    /// Fiat value of `fee_native`.
    pub fee_value: Option<Decimal>,
    pub export_kind: ExportKind,
    /// Resolved contract-call method name.
    pub method: Option<String>,
    /// Chain or venue tag (e.g. "ethereum", "arbitrum").
    pub platform: String,
}

impl Transfer {
    /// Create a fungible token transfer with no price, fee or method.
    pub fn new(
        tx_hash: TxHash,
        timestamp: Timestamp,
        from: Address,
        to: Address,
        token: TokenId,
        amount: Decimal,
    ) -> Self {
        Transfer {
            tx_hash,
            timestamp,
            from,
            to,
            token,
            amount: Some(amount),
            unit_price: None,
            value: None,
            fee_native: Decimal::zero(),
            fee_value: None,
            export_kind: ExportKind::Erc20,
            method: None,
            platform: "ethereum".to_string(),
        }
    }

    /// Set the unit price and derive the fiat value from it.
    pub fn with_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self.value = self.amount.map(|a| a * unit_price);
        self
    }

    /// Override the fiat value.
    pub fn with_value(mut self, value: Decimal) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_fee(mut self, fee_native: Decimal, fee_value: Option<Decimal>) -> Self {
        self.fee_native = fee_native;
        self.fee_value = fee_value;
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_export_kind(mut self, kind: ExportKind) -> Self {
        self.export_kind = kind;
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Turn this row into an NFT movement (no fungible amount).
    pub fn into_nft(mut self) -> Self {
        self.export_kind = ExportKind::Erc721;
        self.amount = None;
        self.unit_price = None;
        self.value = None;
        self
    }

    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or_default()
    }

    /// Fiat value of the movement: the explicit value, else `price * amount`.
    pub fn fiat_value(&self) -> Option<Decimal> {
        self.value
            .or_else(|| Some(self.unit_price? * self.amount?))
    }

    /// Quoted unit price: the explicit price, else `value / amount`.
    pub fn quoted_price(&self) -> Option<Decimal> {
        self.unit_price
            .or_else(|| self.value?.checked_div(self.amount?))
    }

    pub fn is_zero_amount(&self) -> bool {
        self.amount.is_some_and(|a| a.is_zero())
    }

    pub fn is_nft(&self) -> bool {
        self.export_kind == ExportKind::Erc721 && self.amount.is_none()
    }

    /// Carries a positive fiat value.
    pub fn is_priced(&self) -> bool {
        self.fiat_value().is_some_and(|v| v.is_positive())
    }

    /// Moves a positive amount of a token absent from the price catalog.
    pub fn is_unpriced(&self) -> bool {
        self.amount.is_some_and(|a| a.is_positive()) && self.unit_price.is_none()
    }
}

/// Stable per-row identifier: `<tx hash>#<ordinal within the transaction>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey(pub String);

impl RowKey {
    pub fn new(tx_hash: &TxHash, ordinal: usize) -> Self {
        RowKey(format!("{}#{}", tx_hash.as_str(), ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A transfer paired with its stable row key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedTransfer {
    pub key: RowKey,
    pub transfer: Transfer,
}
