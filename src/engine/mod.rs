//! Deterministic classification and accounting over the ledger.

pub mod accounting;
pub mod classifier;
pub mod profile;
pub mod summary;

pub use accounting::{Accountant, AccountingReport, Diagnostic, DiagnosticKind, DiagnosticRecord};
pub use classifier::{
    classify, classify_row, Classification, ClassificationError, ClassificationIssue, TxSummary,
};
pub use profile::Profile;
pub use summary::{GainSummary, YearTotals};
