//! Token ownership model.
//!
//! A [`Token`] is either a [`BaseToken`] backed by a queue of lots, or a
//! [`CompositeToken`] (a receipt for a wrapped/staked position) that owns a bundle
//! of underlying tokens. Composites nest, forming a strict tree.

use crate::domain::{Decimal, TokenId};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use super::{LedgerError, Lot};

/// Directly held asset. Lots are kept in acquisition order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseToken {
    token: TokenId,
    lots: Vec<Lot>,
}

impl BaseToken {
    pub fn new(token: TokenId) -> Self {
        Self {
            token,
            lots: Vec::new(),
        }
    }

    /// A token holding a single lot.
    pub fn with_lot(token: TokenId, count: Decimal, unit_cost: Decimal) -> Result<Self, LedgerError> {
        let mut base = Self::new(token);
        base.add_lot(count, unit_cost)?;
        Ok(base)
    }

    pub fn token_id(&self) -> &TokenId {
        &self.token
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    /// Record a new acquisition as the most recent lot.
    pub fn add_lot(&mut self, count: Decimal, unit_cost: Decimal) -> Result<(), LedgerError> {
        self.lots.push(Lot::new(self.token.clone(), count, unit_cost)?);
        Ok(())
    }

    pub fn amount(&self) -> Decimal {
        self.lots.iter().map(Lot::count).sum()
    }

    pub fn cost(&self) -> Decimal {
        self.lots.iter().map(Lot::cost).sum()
    }

    /// Append `other`'s lots after ours.
    pub fn merge(&mut self, other: BaseToken) -> Result<(), LedgerError> {
        if other.token != self.token {
            return Err(LedgerError::TokenMismatch {
                token: self.token.clone(),
                other: other.token,
            });
        }
        self.lots.extend(other.lots);
        Ok(())
    }

    /// Remove `amount` using LIFO lot consumption.
    ///
    /// The returned token lists the consumed lots in acquisition order. A lot left
    /// with less than `EPS` is consumed whole, so cost is partitioned exactly between
    /// `self` and the result.
    pub fn remove(&mut self, amount: Decimal) -> Result<BaseToken, LedgerError> {
        let available = self.amount();
        if amount - available > Decimal::eps() {
            return Err(LedgerError::InsufficientLots {
                token: self.token.clone(),
                requested: amount,
                missing: amount - available,
            });
        }

        let mut taken_lots = Vec::new();
        let mut remaining = amount;
        while remaining > Decimal::eps() {
            let Some(lot) = self.lots.pop() else {
                return Err(LedgerError::InsufficientLots {
                    token: self.token.clone(),
                    requested: amount,
                    missing: remaining,
                });
            };

            let taken = if lot.count() - remaining > Decimal::eps() {
                remaining
            } else {
                lot.count()
            };
            remaining -= taken;
            taken_lots.push(lot.with_count(taken));

            let leftover = lot.count() - taken;
            if leftover.is_positive() {
                // Still the most recent lot.
                self.lots.push(lot.with_count(leftover));
            }
        }

        taken_lots.reverse();
        Ok(BaseToken {
            token: self.token.clone(),
            lots: taken_lots,
        })
    }

    /// Remove `ratio` (0..=1) of the current amount, LIFO.
    pub fn remove_ratio(&mut self, ratio: Decimal) -> Result<BaseToken, LedgerError> {
        check_ratio(&self.token, ratio)?;
        self.remove(self.amount() * ratio)
    }
}

/// Receipt token whose value decomposes into a bundle of underlying tokens.
///
/// Removal is pro-rata over the whole bundle: the composite does not track the
/// acquisition order of its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeToken {
    token: TokenId,
    total_count: Decimal,
    underlying: BTreeMap<TokenId, Token>,
}

impl CompositeToken {
    /// Empty leaves in `underlying` are dropped.
    pub fn new(
        token: TokenId,
        total_count: Decimal,
        mut underlying: BTreeMap<TokenId, Token>,
    ) -> Self {
        underlying.retain(|_, leaf| !leaf.is_empty());
        Self {
            token,
            total_count,
            underlying,
        }
    }

    pub fn token_id(&self) -> &TokenId {
        &self.token
    }

    pub fn amount(&self) -> Decimal {
        self.total_count
    }

    pub fn cost(&self) -> Decimal {
        self.underlying.values().map(Token::cost).sum()
    }

    pub fn underlying(&self) -> &BTreeMap<TokenId, Token> {
        &self.underlying
    }

    /// Amount of the named underlying leaf, zero if absent.
    pub fn underlying_amount(&self, token: &TokenId) -> Decimal {
        self.underlying
            .get(token)
            .map(Token::amount)
            .unwrap_or_default()
    }

    pub fn merge(&mut self, other: CompositeToken) -> Result<(), LedgerError> {
        if other.token != self.token {
            return Err(LedgerError::TokenMismatch {
                token: self.token.clone(),
                other: other.token,
            });
        }
        for (id, leaf) in other.underlying {
            if leaf.is_empty() {
                continue;
            }
            match self.underlying.entry(id) {
                Entry::Occupied(mut slot) => slot.get_mut().merge(leaf)?,
                Entry::Vacant(slot) => {
                    slot.insert(leaf);
                }
            }
        }
        self.total_count += other.total_count;
        Ok(())
    }

    /// Remove `amount` receipt units, i.e. the same fraction of every leaf.
    pub fn remove(&mut self, amount: Decimal) -> Result<CompositeToken, LedgerError> {
        if self.total_count.is_dust() {
            return Err(LedgerError::EmptyComposite {
                token: self.token.clone(),
            });
        }
        if amount - self.total_count > Decimal::eps() {
            return Err(LedgerError::InsufficientComposite {
                token: self.token.clone(),
                requested: amount,
                available: self.total_count,
            });
        }
        let ratio = (amount / self.total_count).min(Decimal::one());
        self.remove_ratio(ratio)
    }

    /// Remove `ratio` (0..=1) of the receipt count and of every underlying leaf.
    pub fn remove_ratio(&mut self, ratio: Decimal) -> Result<CompositeToken, LedgerError> {
        check_ratio(&self.token, ratio)?;

        let removed_count = self.total_count * ratio;
        let mut removed = BTreeMap::new();
        for (id, leaf) in self.underlying.iter_mut() {
            let part = leaf.remove_ratio(ratio)?;
            if !part.is_empty() {
                removed.insert(id.clone(), part);
            }
        }
        self.underlying.retain(|_, leaf| !leaf.is_empty());
        self.total_count -= removed_count;

        Ok(CompositeToken::new(self.token.clone(), removed_count, removed))
    }

    /// Extract `amount` of one named leaf, leaving the other leaves and the
    /// receipt count untouched.
    pub fn withdraw(&mut self, token: &TokenId, amount: Decimal) -> Result<Token, LedgerError> {
        let leaf = self
            .underlying
            .get_mut(token)
            .ok_or_else(|| LedgerError::UnknownUnderlying {
                receipt: self.token.clone(),
                token: token.clone(),
            })?;
        let out = leaf.remove(amount)?;
        if leaf.is_empty() {
            self.underlying.remove(token);
        }
        Ok(out)
    }
}

/// Closed union over the token variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Token {
    Base(BaseToken),
    Composite(CompositeToken),
}

impl Token {
    pub fn token_id(&self) -> &TokenId {
        match self {
            Token::Base(b) => b.token_id(),
            Token::Composite(c) => c.token_id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Token::Base(_) => "base",
            Token::Composite(_) => "composite",
        }
    }

    pub fn amount(&self) -> Decimal {
        match self {
            Token::Base(b) => b.amount(),
            Token::Composite(c) => c.amount(),
        }
    }

    pub fn cost(&self) -> Decimal {
        match self {
            Token::Base(b) => b.cost(),
            Token::Composite(c) => c.cost(),
        }
    }

    /// `cost / amount`, `None` when empty.
    pub fn cost_basis(&self) -> Option<Decimal> {
        if self.is_empty() {
            return None;
        }
        self.cost().checked_div(self.amount())
    }

    pub fn is_empty(&self) -> bool {
        self.amount() < Decimal::eps()
    }

    /// Merge a token of the same variant and id into this one.
    pub fn merge(&mut self, other: Token) -> Result<(), LedgerError> {
        match (self, other) {
            (Token::Base(a), Token::Base(b)) => a.merge(b),
            (Token::Composite(a), Token::Composite(b)) => a.merge(b),
            (existing, other) => Err(LedgerError::VariantMismatch {
                token: existing.token_id().clone(),
                existing: existing.kind(),
                other: other.kind(),
            }),
        }
    }

    /// Extract exactly `amount`, returning a token of the same variant.
    pub fn remove(&mut self, amount: Decimal) -> Result<Token, LedgerError> {
        match self {
            Token::Base(b) => b.remove(amount).map(Token::Base),
            Token::Composite(c) => c.remove(amount).map(Token::Composite),
        }
    }

    pub fn remove_ratio(&mut self, ratio: Decimal) -> Result<Token, LedgerError> {
        match self {
            Token::Base(b) => b.remove_ratio(ratio).map(Token::Base),
            Token::Composite(c) => c.remove_ratio(ratio).map(Token::Composite),
        }
    }

    /// Amount of `token` wrapped directly inside this one. Base tokens wrap nothing.
    pub fn underlying_amount(&self, token: &TokenId) -> Decimal {
        match self {
            Token::Base(_) => Decimal::zero(),
            Token::Composite(c) => c.underlying_amount(token),
        }
    }

    /// Unwrap `amount` of one named underlying leaf.
    pub fn withdraw(&mut self, token: &TokenId, amount: Decimal) -> Result<Token, LedgerError> {
        match self {
            Token::Base(b) => Err(LedgerError::UnknownUnderlying {
                receipt: b.token_id().clone(),
                token: token.clone(),
            }),
            Token::Composite(c) => c.withdraw(token, amount),
        }
    }

    /// Add every base leaf amount beneath this token into `acc`.
    pub fn collect_leaves(&self, acc: &mut BTreeMap<TokenId, Decimal>) {
        match self {
            Token::Base(b) => *acc.entry(b.token_id().clone()).or_default() += b.amount(),
            Token::Composite(c) => {
                for leaf in c.underlying().values() {
                    leaf.collect_leaves(acc);
                }
            }
        }
    }
}

impl From<BaseToken> for Token {
    fn from(value: BaseToken) -> Self {
        Token::Base(value)
    }
}

impl From<CompositeToken> for Token {
    fn from(value: CompositeToken) -> Self {
        Token::Composite(value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Base(b) => write!(f, "{}: {} (cost {})", b.token_id(), b.amount(), b.cost()),
            Token::Composite(c) => {
                write!(f, "{}: {} (wraps:", c.token_id(), c.amount())?;
                for leaf in c.underlying().values() {
                    write!(f, " [{}]", leaf)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn check_ratio(token: &TokenId, ratio: Decimal) -> Result<(), LedgerError> {
    if ratio.is_negative() || ratio > Decimal::one() {
        return Err(LedgerError::InvalidRatio {
            token: token.clone(),
            ratio,
        });
    }
    Ok(())
}
