//! Transfer table stored as a CSV file.

use super::{SourceError, TransferSource};
use crate::domain::{Address, Decimal, ExportKind, Timestamp, TokenId, Transfer, TxHash};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const DEFAULT_PLATFORM: &str = "ethereum";

#[derive(Debug, Clone)]
pub struct CsvTransferSource {
    path: PathBuf,
}

impl CsvTransferSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parse the table. Empty cells are treated as missing values.
    pub fn parse_csv(csv_bytes: &[u8]) -> Result<Vec<Transfer>, SourceError> {
        #[derive(Debug, serde::Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct Row {
            hash: String,
            #[serde(rename = "TimeStamp")]
            timestamp: i64,
            from: String,
            to: String,
            token_symbol: String,
            amount: Option<String>,
            token_price: Option<String>,
            value: Option<String>,
            txn_fee: Option<String>,
            txn_fee_value: Option<String>,
            export_type: Option<String>,
            method: Option<String>,
            platform: Option<String>,
        }

        fn non_empty(cell: Option<String>) -> Option<String> {
            cell.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }

        fn decimal(
            cell: Option<String>,
            line: u64,
            field: &'static str,
        ) -> Result<Option<Decimal>, SourceError> {
            non_empty(cell)
                .map(|s| {
                    Decimal::from_str_canonical(&s).map_err(|_| SourceError::InvalidField {
                        line,
                        field,
                        value: s.clone(),
                    })
                })
                .transpose()
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_bytes);

        let csv_error = |e: csv::Error| SourceError::Csv {
            line: e.position().map(|p| p.line()).unwrap_or_default(),
            message: e.to_string(),
        };
        let headers = reader.headers().map_err(csv_error)?.clone();

        let mut transfers = Vec::new();
        let mut record = csv::StringRecord::new();
        while reader.read_record(&mut record).map_err(csv_error)? {
            let row: Row = record.deserialize(Some(&headers)).map_err(csv_error)?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let export_kind = match non_empty(row.export_type) {
                Some(kind) => kind
                    .parse::<ExportKind>()
                    .map_err(|_| SourceError::InvalidField {
                        line,
                        field: "ExportType",
                        value: kind.clone(),
                    })?,
                None => ExportKind::Erc20,
            };

            let amount = decimal(row.amount, line, "Amount")?;
            let unit_price = decimal(row.token_price, line, "TokenPrice")?;
            let value = decimal(row.value, line, "Value")?
                .or_else(|| Some(unit_price? * amount?));

            transfers.push(Transfer {
                tx_hash: TxHash::new(row.hash),
                timestamp: Timestamp::new(row.timestamp),
                from: Address::new(row.from),
                to: Address::new(row.to),
                token: TokenId::new(row.token_symbol),
                amount,
                unit_price,
                value,
                fee_native: decimal(row.txn_fee, line, "TxnFee")?.unwrap_or_default(),
                fee_value: decimal(row.txn_fee_value, line, "TxnFeeValue")?,
                export_kind,
                method: non_empty(row.method),
                platform: non_empty(row.platform)
                    .map(|p| p.to_lowercase())
                    .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            });
        }

        Ok(transfers)
    }
}

#[async_trait]
impl TransferSource for CsvTransferSource {
    async fn fetch_transfers(&self) -> Result<Vec<Transfer>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::Io {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        let transfers = Self::parse_csv(&bytes)?;
        tracing::info!(path = %self.path.display(), rows = transfers.len(), "loaded transfers");
        Ok(transfers)
    }
}
