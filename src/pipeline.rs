//! One complete run: fetch, account, and write outputs.

use crate::config::Config;
use crate::datasource::TransferSource;
use crate::engine::{Accountant, AccountingReport, Profile};
use crate::error::AppError;
use crate::export;
use std::path::Path;

/// Fetch every transfer from `source` and run the accounting engine over it.
pub async fn account(
    source: &dyn TransferSource,
    profile: Profile,
) -> Result<AccountingReport, AppError> {
    let transfers = source.fetch_transfers().await?;
    let report = Accountant::new(profile).run(transfers)?;
    Ok(report)
}

/// Run the configured pipeline and write the annotated rows (and the holdings
/// snapshot when a path is configured).
pub async fn run(config: &Config, source: &dyn TransferSource) -> Result<AccountingReport, AppError> {
    let report = account(source, Profile::from_config(config)).await?;

    export::write_annotated_csv(Path::new(&config.output_path), &report.rows).await?;
    if let Some(path) = &config.holdings_path {
        export::write_holdings_json(Path::new(path), &report, &config.reporting_currency).await?;
    }

    if report.error_rows() > 0 {
        tracing::warn!(rows = report.error_rows(), "rows need manual review");
    }
    tracing::info!(
        currency = %config.reporting_currency,
        total_cost = %report.total_cost(),
        "cost basis of current holdings"
    );
    for line in report.gain_summary().to_string().lines() {
        tracing::info!("{}", line);
    }

    Ok(report)
}
