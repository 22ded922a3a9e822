//! Output writers: annotated transfer rows and the holdings snapshot.

use crate::domain::{AnnotatedTransfer, Decimal};
use crate::engine::{AccountingReport, DiagnosticRecord, GainSummary};
use crate::ledger::Holdings;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json encode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AnnotatedRow<'a> {
    row_key: &'a str,
    hash: &'a str,
    #[serde(rename = "TimeStamp")]
    timestamp: i64,
    date: String,
    from: &'a str,
    to: &'a str,
    token_symbol: &'a str,
    amount: String,
    token_price: String,
    value: String,
    txn_fee: String,
    txn_fee_value: String,
    export_type: &'a str,
    method: &'a str,
    platform: &'a str,
    row_category: &'a str,
    tx_category: &'a str,
    cost: String,
    #[serde(rename = "Gain/Loss")]
    gain_loss: String,
    #[serde(rename = "TxnFee(Cost)")]
    fee_cost: String,
    #[serde(rename = "TxnFee(Gain/Loss)")]
    fee_gain_loss: String,
}

fn cell(value: Option<Decimal>) -> String {
    value.map(|v| v.to_canonical_string()).unwrap_or_default()
}

/// Render annotated rows as CSV: the input columns followed by the outcome columns.
pub fn annotated_csv(rows: &[AnnotatedTransfer]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        let (t, o) = (&row.transfer, &row.outcome);
        writer.serialize(AnnotatedRow {
            row_key: o.row_key.as_str(),
            hash: t.tx_hash.as_str(),
            timestamp: t.timestamp.as_secs(),
            date: t.timestamp.date_string(),
            from: t.from.as_str(),
            to: t.to.as_str(),
            token_symbol: t.token.as_str(),
            amount: cell(t.amount),
            token_price: cell(t.unit_price),
            value: cell(t.value),
            txn_fee: t.fee_native.to_canonical_string(),
            txn_fee_value: cell(t.fee_value),
            export_type: t.export_kind.as_str(),
            method: t.method.as_deref().unwrap_or_default(),
            platform: &t.platform,
            row_category: o.row_category.as_str(),
            tx_category: o.tx_category.as_str(),
            cost: o.cost.to_canonical_string(),
            gain_loss: o.gain_loss.to_canonical_string(),
            fee_cost: o.fee_cost.to_canonical_string(),
            fee_gain_loss: o.fee_gain_loss.to_canonical_string(),
        })?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))
}

#[derive(Debug, Serialize)]
struct HoldingsDocument<'a> {
    reporting_currency: &'a str,
    total_cost: Decimal,
    holdings: Holdings,
    gains: GainSummary,
    diagnostics: Vec<DiagnosticRecord>,
}

/// Pretty JSON with the holdings snapshot, total cost, yearly gains and diagnostics.
pub fn holdings_json(report: &AccountingReport, reporting_currency: &str) -> Result<String, ExportError> {
    let document = HoldingsDocument {
        reporting_currency,
        total_cost: report.total_cost(),
        holdings: report.holdings(),
        gains: report.gain_summary(),
        diagnostics: report.diagnostics.iter().map(DiagnosticRecord::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
}

pub async fn write_annotated_csv(path: &Path, rows: &[AnnotatedTransfer]) -> Result<(), ExportError> {
    write_file(path, &annotated_csv(rows)?).await?;
    tracing::info!(path = %path.display(), rows = rows.len(), "wrote annotated rows");
    Ok(())
}

pub async fn write_holdings_json(
    path: &Path,
    report: &AccountingReport,
    reporting_currency: &str,
) -> Result<(), ExportError> {
    write_file(path, holdings_json(report, reporting_currency)?.as_bytes()).await?;
    tracing::info!(path = %path.display(), "wrote holdings snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Address, RowCategory, RowKey, RowOutcome, Timestamp, TokenId, Transfer, TxCategory, TxHash,
    };
    use crate::ledger::Ledger;

    fn sample_rows() -> Vec<AnnotatedTransfer> {
        let hash = TxHash::new("0xaa");
        let transfer = Transfer::new(
            hash.clone(),
            Timestamp::new(1_614_816_000),
            Address::new("0xme"),
            Address::new("0xshop"),
            TokenId::new("USDC"),
            Decimal::from(200),
        )
        .with_value(Decimal::from(205));
        let mut outcome = RowOutcome::new(
            RowKey::new(&hash, 0),
            RowCategory::PaymentOut,
            TxCategory::TransferOut,
        );
        outcome.cost = Decimal::from(200);
        outcome.gain_loss = Decimal::from(5);
        vec![AnnotatedTransfer { transfer, outcome }]
    }

    #[test]
    fn test_csv_has_outcome_columns() {
        let bytes = annotated_csv(&sample_rows()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("RowKey,Hash,TimeStamp,Date,"));
        assert!(header.ends_with("RowCategory,TxCategory,Cost,Gain/Loss,TxnFee(Cost),TxnFee(Gain/Loss)"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("0xaa#0,0xaa,1614816000,2021-03-04,0xme,0xshop,USDC,200,,205,"));
        assert!(row.contains("PAYMENT_OUT,TRANSFER_OUT,200,5,0,0"));
    }

    #[test]
    fn test_holdings_document_lists_leaves() {
        let mut ledger = Ledger::new();
        ledger
            .add_buy(&TokenId::new("USDC"), Decimal::from(800), Decimal::one())
            .unwrap();
        let report = AccountingReport {
            ledger,
            rows: sample_rows(),
            diagnostics: Vec::new(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&holdings_json(&report, "EUR").unwrap()).unwrap();
        assert_eq!(json["reporting_currency"], "EUR");
        assert_eq!(json["holdings"]["USDC"], 800.0);
        assert_eq!(json["total_cost"], 800.0);
        assert_eq!(json["gains"]["total"]["gain_loss"], 5.0);
    }
}
