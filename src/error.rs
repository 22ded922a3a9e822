use crate::config::ConfigError;
use crate::datasource::SourceError;
use crate::export::ExportError;
use crate::ledger::LedgerError;
use thiserror::Error;

/// Any error that stops a run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Input error: {0}")]
    Source(#[from] SourceError),
    #[error("Ledger invariant violated: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Output error: {0}")]
    Export(#[from] ExportError),
}
