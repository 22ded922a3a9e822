//! Input collaborator: delivers the normalized, price-enriched transfer table.

use crate::domain::Transfer;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod csv_file;
pub mod mock;

pub use csv_file::CsvTransferSource;
pub use mock::MockTransferSource;

/// Source of transfer rows. Fetching, method resolution and price enrichment
/// happen behind this trait; the engine only sees finished rows.
#[async_trait]
pub trait TransferSource: Send + Sync + fmt::Debug {
    /// Fetch every transfer row. Order does not matter; the engine sorts by
    /// timestamp and keeps the delivered order for ties.
    async fn fetch_transfers(&self) -> Result<Vec<Transfer>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("csv parse error at line {line}: {message}")]
    Csv { line: u64, message: String },
    #[error("invalid {field} at line {line}: {value}")]
    InvalidField {
        line: u64,
        field: &'static str,
        value: String,
    },
}
