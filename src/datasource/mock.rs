//! In-memory transfer source for tests.

use super::{SourceError, TransferSource};
use crate::domain::Transfer;
use async_trait::async_trait;

/// Returns a fixed set of rows.
#[derive(Debug, Clone, Default)]
pub struct MockTransferSource {
    transfers: Vec<Transfer>,
}

impl MockTransferSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transfer(mut self, transfer: Transfer) -> Self {
        self.transfers.push(transfer);
        self
    }

    pub fn with_transfers(mut self, transfers: Vec<Transfer>) -> Self {
        self.transfers.extend(transfers);
        self
    }
}

#[async_trait]
impl TransferSource for MockTransferSource {
    async fn fetch_transfers(&self) -> Result<Vec<Transfer>, SourceError> {
        Ok(self.transfers.clone())
    }
}
