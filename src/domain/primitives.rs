//! Domain primitives: TokenId, Address, TxHash, Timestamp, ExportKind.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token identifier (the token symbol, e.g. "ETH", "USDC").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(symbol: impl Into<String>) -> Self {
        TokenId(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account or contract address. Normalized to trimmed lowercase so that
/// checksummed and lowercase spellings compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl AsRef<str>) -> Self {
        Address(addr.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the (lowercased) address text contains `marker`.
    pub fn contains(&self, marker: &str) -> bool {
        self.0.contains(&marker.to_lowercase())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An external contract holding deposits is identified by its address.
pub type ContractId = Address;

/// On-chain transaction hash shared by every transfer row of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    pub fn new(hash: impl Into<String>) -> Self {
        TxHash(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block time in seconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn new(secs: i64) -> Self {
        Timestamp(secs)
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.0, 0)
    }

    /// Calendar year (UTC), used to bucket realized gains for reporting.
    pub fn year(&self) -> Option<i32> {
        self.to_datetime().map(|dt| dt.year())
    }

    /// `YYYY-MM-DD` (UTC).
    pub fn date_string(&self) -> String {
        self.to_datetime()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Which explorer export a transfer row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    /// Native-asset transaction.
    Normal,
    /// Fungible token transfer.
    Erc20,
    /// Internal (contract-initiated) native transfer.
    Internal,
    /// Non-fungible token transfer.
    Erc721,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Normal => "normal",
            ExportKind::Erc20 => "erc20",
            ExportKind::Internal => "internal",
            ExportKind::Erc721 => "erc721",
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(ExportKind::Normal),
            "erc20" | "token" => Ok(ExportKind::Erc20),
            "internal" => Ok(ExportKind::Internal),
            "erc721" | "nft" => Ok(ExportKind::Erc721),
            other => Err(format!("unknown export kind: {}", other)),
        }
    }
}
