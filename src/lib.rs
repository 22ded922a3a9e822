pub mod config;
pub mod datasource;
pub mod domain;
pub mod engine;
pub mod error;
pub mod export;
pub mod ledger;
pub mod pipeline;

pub use config::Config;
pub use datasource::{CsvTransferSource, MockTransferSource, SourceError, TransferSource};
pub use domain::{
    Address, AnnotatedTransfer, ContractId, Decimal, ExportKind, RowCategory, RowKey, RowOutcome,
    Timestamp, TokenId, Transfer, TxCategory, TxHash,
};
pub use engine::{Accountant, AccountingReport, Diagnostic, DiagnosticKind, GainSummary, Profile};
pub use error::AppError;
pub use ledger::{Holdings, Ledger, LedgerError, Token};
