//! Cost-basis ledger: lots, base and composite tokens, contract deposits.
//!
//! The ledger exclusively owns every held token. Value moves between entries by
//! removal from one slot and insertion into another; nothing is shared.

use crate::domain::{ContractId, Decimal, TokenId, TxCategory, TxHash};
use thiserror::Error;

pub mod deposit;
pub mod holdings;
pub mod lot;
pub mod portfolio;
pub mod token;

pub use deposit::DepositRecord;
pub use holdings::{Holdings, Valuation};
pub use lot::Lot;
pub use portfolio::Ledger;
pub use token::{BaseToken, CompositeToken, Token};

/// A ledger invariant was violated. The ledger can no longer be trusted and the
/// run must stop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no spot holding of {token}")]
    UnknownHolding { token: TokenId },

    #[error("no deposits recorded in contract {contract}")]
    UnknownContract { contract: ContractId },

    #[error("contract {contract} holds no {token}")]
    NotDeposited {
        contract: ContractId,
        token: TokenId,
    },

    #[error("{receipt} does not wrap any {token}")]
    UnknownUnderlying { receipt: TokenId, token: TokenId },

    #[error("lots of {token} exhausted: requested {requested}, {missing} missing")]
    InsufficientLots {
        token: TokenId,
        requested: Decimal,
        missing: Decimal,
    },

    #[error("cannot remove {requested} of composite {token} holding {available}")]
    InsufficientComposite {
        token: TokenId,
        requested: Decimal,
        available: Decimal,
    },

    #[error("invalid removal ratio {ratio} for {token}")]
    InvalidRatio { token: TokenId, ratio: Decimal },

    #[error("composite {token} has zero total count")]
    EmptyComposite { token: TokenId },

    #[error("cannot merge {other} token into {existing} token {token}")]
    VariantMismatch {
        token: TokenId,
        existing: &'static str,
        other: &'static str,
    },

    #[error("cannot merge {other} into {token}")]
    TokenMismatch { token: TokenId, other: TokenId },

    #[error("invalid lot for {token}: count {count}, unit cost {unit_cost}")]
    InvalidLot {
        token: TokenId,
        count: Decimal,
        unit_cost: Decimal,
    },

    #[error("{category} transaction {tx} has {incoming} incoming and {outgoing} outgoing legs")]
    MissingLegs {
        tx: TxHash,
        category: TxCategory,
        incoming: usize,
        outgoing: usize,
    },

    #[error("contract deposit in {tx} has no target contract")]
    MissingContract { tx: TxHash },
}
