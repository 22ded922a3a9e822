//! Domain types for the cost-basis ledger.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: TokenId, Address, TxHash, Timestamp, ExportKind
//! - The input Transfer row and its stable RowKey
//! - Transaction/row categories and per-row outcomes
//! - Chronological ordering and transaction grouping

pub mod category;
pub mod decimal;
pub mod ordering;
pub mod outcome;
pub mod primitives;
pub mod transfer;

pub use category::{RowCategory, TxCategory};
pub use decimal::Decimal;
pub use ordering::{prepare_transactions, TxGroup};
pub use outcome::{AnnotatedTransfer, RowOutcome};
pub use primitives::{Address, ContractId, ExportKind, Timestamp, TokenId, TxHash};
pub use transfer::{KeyedTransfer, RowKey, Transfer};
