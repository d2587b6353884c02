//! The color registry: an append-only token list that refuses duplicates.
//!
//! # Invariants
//!
//! - No two tokens share a [`ColorValue`] (exact, case-sensitive match).
//! - `tokens[k].index == k + 1`: indexing is dense and gapless.
//! - Tokens are never removed, reordered, or edited once appended.
//!
//! Format is not validated here; callers are expected to validate input before
//! minting. The registry only arbitrates uniqueness and ordering.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::types::{
    AccountId, ColorToken, ColorValue, MintEvent, TokenIndex, CONTRACT_NAME, CONTRACT_SYMBOL,
};

/// Authoritative registry state for one deployment.
///
/// Persisted through [`RegistrySnapshot`]; loading a snapshot re-checks both
/// invariants, so a hand-edited file cannot smuggle in a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RegistrySnapshot", into = "RegistrySnapshot")]
pub struct Registry {
    tokens: Vec<ColorToken>,
    values: HashSet<ColorValue>,
    created_at: DateTime<Utc>,
}

/// On-disk shape of a [`Registry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub name: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tokens: Vec<ColorToken>,
}

impl Registry {
    /// An empty registry, as created by deployment.
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            values: HashSet::new(),
            created_at: Utc::now(),
        }
    }

    /// A registry pre-populated by minting `values` in order as `owner`.
    pub fn seeded<I, V>(owner: &AccountId, values: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<ColorValue>,
    {
        let mut registry = Self::new();
        for value in values {
            registry.mint(owner, value.into())?;
        }
        Ok(registry)
    }

    /// Drop every token. Only for test fixtures and fresh deployments.
    pub fn reset(&mut self) {
        self.tokens.clear();
        self.values.clear();
        self.created_at = Utc::now();
    }

    pub fn name(&self) -> &'static str {
        CONTRACT_NAME
    }

    pub fn symbol(&self) -> &'static str {
        CONTRACT_SYMBOL
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append `value` as a new token owned by `owner`.
    ///
    /// Fails with [`RegistryError::DuplicateValue`] and leaves the registry
    /// untouched if the exact string is already registered.
    pub fn mint(&mut self, owner: &AccountId, value: ColorValue) -> Result<MintEvent, RegistryError> {
        if self.values.contains(&value) {
            return Err(RegistryError::DuplicateValue { value });
        }
        let index = TokenIndex(self.total_supply() + 1);
        self.values.insert(value.clone());
        self.tokens.push(ColorToken {
            index,
            value,
            owner: owner.clone(),
            minted_at: Utc::now(),
        });
        Ok(MintEvent {
            from: AccountId::zero(),
            to: owner.clone(),
            index,
        })
    }

    pub fn total_supply(&self) -> u64 {
        self.tokens.len() as u64
    }

    pub fn contains(&self, value: &ColorValue) -> bool {
        self.values.contains(value)
    }

    /// 0-based lookup of the color minted at `position`.
    pub fn color_at(&self, position: u64) -> Result<&ColorValue, RegistryError> {
        usize::try_from(position)
            .ok()
            .and_then(|i| self.tokens.get(i))
            .map(|token| &token.value)
            .ok_or(RegistryError::NotFound {
                position,
                total_supply: self.total_supply(),
            })
    }

    /// Colors at positions `[start, start + count)`, in mint order.
    ///
    /// The whole range must exist; a range running past the end fails with
    /// `NotFound` naming the first missing position.
    pub fn colors_range(&self, start: u64, count: u64) -> Result<Vec<ColorValue>, RegistryError> {
        let end = start.saturating_add(count);
        if end > self.total_supply() {
            return Err(RegistryError::NotFound {
                position: start.max(self.total_supply()),
                total_supply: self.total_supply(),
            });
        }
        // Both bounds fit in usize: they are <= tokens.len().
        Ok(self.tokens[start as usize..end as usize]
            .iter()
            .map(|token| token.value.clone())
            .collect())
    }

    /// 1-based lookup by token index.
    pub fn token(&self, index: TokenIndex) -> Result<&ColorToken, RegistryError> {
        index
            .0
            .checked_sub(1)
            .and_then(|position| usize::try_from(position).ok())
            .and_then(|i| self.tokens.get(i))
            .ok_or(RegistryError::TokenNotFound { index })
    }

    pub fn owner_of(&self, index: TokenIndex) -> Result<&AccountId, RegistryError> {
        self.token(index).map(|token| &token.owner)
    }

    pub fn balance_of(&self, owner: &AccountId) -> u64 {
        self.tokens_of(owner).count() as u64
    }

    pub fn tokens_of<'a>(&'a self, owner: &'a AccountId) -> impl Iterator<Item = &'a ColorToken> {
        self.tokens.iter().filter(move |token| &token.owner == owner)
    }

    pub fn tokens(&self) -> &[ColorToken] {
        &self.tokens
    }

    pub fn colors(&self) -> impl Iterator<Item = &ColorValue> {
        self.tokens.iter().map(|token| &token.value)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<RegistrySnapshot> for Registry {
    type Error = RegistryError;

    fn try_from(snapshot: RegistrySnapshot) -> Result<Self, Self::Error> {
        let mut values = HashSet::with_capacity(snapshot.tokens.len());
        for (k, token) in snapshot.tokens.iter().enumerate() {
            let expected = k as u64 + 1;
            if token.index.0 != expected {
                return Err(RegistryError::Corrupt {
                    reason: format!("token at position {k} has index {}, expected {expected}", token.index),
                });
            }
            if !values.insert(token.value.clone()) {
                return Err(RegistryError::Corrupt {
                    reason: format!("color {} appears more than once", token.value),
                });
            }
        }
        Ok(Self {
            tokens: snapshot.tokens,
            values,
            created_at: snapshot.created_at,
        })
    }
}

impl From<Registry> for RegistrySnapshot {
    fn from(registry: Registry) -> Self {
        Self {
            name: CONTRACT_NAME.to_owned(),
            symbol: CONTRACT_SYMBOL.to_owned(),
            created_at: registry.created_at,
            tokens: registry.tokens,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
