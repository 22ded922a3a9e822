use crate::domain::{Decimal, TokenId};
use serde::Serialize;

use super::LedgerError;

/// One acquisition of a base token at a fixed unit cost basis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lot {
    token: TokenId,
    count: Decimal,
    unit_cost: Decimal,
}

impl Lot {
    /// Create a lot. `count` must be positive and `unit_cost` non-negative.
    pub fn new(token: TokenId, count: Decimal, unit_cost: Decimal) -> Result<Self, LedgerError> {
        if !count.is_positive() || unit_cost.is_negative() {
            return Err(LedgerError::InvalidLot {
                token,
                count,
                unit_cost,
            });
        }
        Ok(Self {
            token,
            count,
            unit_cost,
        })
    }

    pub fn token(&self) -> &TokenId {
        &self.token
    }

    pub fn count(&self) -> Decimal {
        self.count
    }

    pub fn unit_cost(&self) -> Decimal {
        self.unit_cost
    }

    pub fn cost(&self) -> Decimal {
        self.count * self.unit_cost
    }

    /// Same token and unit cost, different count. Caller guarantees `count > 0`.
    pub(crate) fn with_count(&self, count: Decimal) -> Lot {
        Lot {
            token: self.token.clone(),
            count,
            unit_cost: self.unit_cost,
        }
    }
}
