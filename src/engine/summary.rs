use crate::domain::{AnnotatedTransfer, Decimal};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Realized results of one calendar year (UTC).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearTotals {
    pub gain_loss: Decimal,
    pub fee_gain_loss: Decimal,
    pub fee_cost: Decimal,
    pub rows: usize,
}

impl YearTotals {
    fn add(&mut self, other: &YearTotals) {
        self.gain_loss += other.gain_loss;
        self.fee_gain_loss += other.fee_gain_loss;
        self.fee_cost += other.fee_cost;
        self.rows += other.rows;
    }

    pub fn net(&self) -> Decimal {
        self.gain_loss + self.fee_gain_loss
    }
}

/// Realized gain/loss bucketed by year, plus grand totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GainSummary {
    pub by_year: BTreeMap<i32, YearTotals>,
    pub total: YearTotals,
}

impl GainSummary {
    pub fn from_rows(rows: &[AnnotatedTransfer]) -> Self {
        let mut summary = GainSummary::default();
        for row in rows {
            // Out-of-range timestamps have no calendar year.
            let Some(year) = row.transfer.timestamp.year() else {
                continue;
            };
            let totals = YearTotals {
                gain_loss: row.outcome.gain_loss,
                fee_gain_loss: row.outcome.fee_gain_loss,
                fee_cost: row.outcome.fee_cost,
                rows: 1,
            };
            summary.by_year.entry(year).or_default().add(&totals);
            summary.total.add(&totals);
        }
        summary
    }

    pub fn year(&self, year: i32) -> Option<&YearTotals> {
        self.by_year.get(&year)
    }
}

impl fmt::Display for GainSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (year, totals) in &self.by_year {
            writeln!(
                f,
                "{}: gain/loss {}, fees {} (net {})",
                year,
                totals.gain_loss,
                totals.fee_gain_loss,
                totals.net()
            )?;
        }
        write!(f, "total: net {}", self.total.net())
    }
}
