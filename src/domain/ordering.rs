//! Chronological ordering and per-transaction grouping of transfer rows.

use crate::domain::{KeyedTransfer, RowKey, Transfer, TxHash};
use std::collections::HashMap;

/// Ordering key for transfer rows.
///
/// Ordering: timestamp -> position in the input. Rows sharing a timestamp keep
/// the order the collaborator delivered them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransferOrderingKey {
    pub timestamp: i64,
    pub input_seq: usize,
}

/// All rows of one on-chain transaction, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxGroup {
    pub tx_hash: TxHash,
    pub rows: Vec<KeyedTransfer>,
}

/// Assign stable row keys (`<hash>#<n>`, `n` counted per transaction in input order).
pub fn key_transfers(transfers: Vec<Transfer>) -> Vec<KeyedTransfer> {
    let mut ordinals: HashMap<TxHash, usize> = HashMap::new();
    transfers
        .into_iter()
        .map(|transfer| {
            let ordinal = ordinals.entry(transfer.tx_hash.clone()).or_insert(0);
            let key = RowKey::new(&transfer.tx_hash, *ordinal);
            *ordinal += 1;
            KeyedTransfer { key, transfer }
        })
        .collect()
}

/// Sort rows ascending by timestamp; ties keep input order.
pub fn sort_chronological(rows: Vec<KeyedTransfer>) -> Vec<KeyedTransfer> {
    let mut indexed: Vec<(TransferOrderingKey, KeyedTransfer)> = rows
        .into_iter()
        .enumerate()
        .map(|(input_seq, row)| {
            let key = TransferOrderingKey {
                timestamp: row.transfer.timestamp.as_secs(),
                input_seq,
            };
            (key, row)
        })
        .collect();
    indexed.sort_by(|a, b| a.0.cmp(&b.0));
    indexed.into_iter().map(|(_, row)| row).collect()
}

/// Group chronologically sorted rows by transaction hash. Groups are ordered by
/// the first appearance of their hash.
pub fn group_transactions(rows: Vec<KeyedTransfer>) -> Vec<TxGroup> {
    let mut index: HashMap<TxHash, usize> = HashMap::new();
    let mut groups: Vec<TxGroup> = Vec::new();
    for row in rows {
        match index.get(&row.transfer.tx_hash) {
            Some(&i) => groups[i].rows.push(row),
            None => {
                index.insert(row.transfer.tx_hash.clone(), groups.len());
                groups.push(TxGroup {
                    tx_hash: row.transfer.tx_hash.clone(),
                    rows: vec![row],
                });
            }
        }
    }
    groups
}

/// Key, sort and group raw transfers in one step.
pub fn prepare_transactions(transfers: Vec<Transfer>) -> Vec<TxGroup> {
    group_transactions(sort_chronological(key_transfers(transfers)))
}
