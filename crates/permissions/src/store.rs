//! In-memory capability token store.

use crate::{PermissionToken, ResourceKey, TokenId};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// A spending token's remaining budget is below the requested amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("spending limit exhausted: requested {requested}, {available} available")]
pub struct InsufficientLimit {
    pub requested: u64,
    pub available: u64,
}

/// Result of charging an originator's spending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendOutcome {
    /// The budget covered the amount; holds the token after the decrement.
    Spent(PermissionToken),
    /// A live token exists but its budget is too small. Nothing was charged.
    Insufficient { available: u64 },
    /// The originator holds no live spending token.
    Missing,
}

/// Issued tokens, one per `(originator, resource)` pair.
///
/// Expired tokens are evicted lazily when a lookup finds them.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: Mutex<HashMap<(String, ResourceKey), PermissionToken>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<(String, ResourceKey), PermissionToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Find a live token for the originator and resource.
    pub fn find(&self, originator: &str, resource: &ResourceKey) -> Option<PermissionToken> {
        let mut tokens = self.lock();
        let key = (originator.to_string(), resource.clone());
        let token = tokens.get(&key)?;
        if token.is_expired_at(Utc::now()) {
            tracing::debug!(originator, token = %token.id, "evicting expired token");
            tokens.remove(&key);
            return None;
        }
        Some(token.clone())
    }

    /// Insert a token, replacing (and returning) any token for the same resource.
    pub fn insert(&self, token: PermissionToken) -> Option<PermissionToken> {
        let key = (token.originator.clone(), token.resource.clone());
        self.lock().insert(key, token)
    }

    /// Remove every token matching the predicate, returning the removed tokens.
    pub fn revoke(&self, predicate: impl Fn(&PermissionToken) -> bool) -> Vec<PermissionToken> {
        let mut tokens = self.lock();
        let doomed: Vec<_> = tokens
            .iter()
            .filter(|(_, token)| predicate(token))
            .map(|(key, _)| key.clone())
            .collect();
        doomed
            .into_iter()
            .filter_map(|key| tokens.remove(&key))
            .collect()
    }

    /// Charge `amount` against a specific spending token.
    ///
    /// Returns the remaining budget. A failed charge leaves the budget untouched.
    pub fn decrement_spending(
        &self,
        id: TokenId,
        amount: u64,
    ) -> Result<u64, InsufficientLimit> {
        let mut tokens = self.lock();
        let Some(token) = tokens.values_mut().find(|token| token.id == id) else {
            return Err(InsufficientLimit {
                requested: amount,
                available: 0,
            });
        };
        charge(token, amount)
    }

    /// Return `amount` to a spending token charged for a call that then failed.
    ///
    /// Returns the restored budget, or `None` if the token has since been
    /// revoked or replaced.
    pub fn refund(&self, id: TokenId, amount: u64) -> Option<u64> {
        let mut tokens = self.lock();
        let token = tokens.values_mut().find(|token| token.id == id)?;
        let restored = token.spending_limit.unwrap_or(0).saturating_add(amount);
        token.spending_limit = Some(restored);
        Some(restored)
    }

    /// Find the originator's live spending token and charge it, under one lock.
    pub fn spend(&self, originator: &str, amount: u64) -> SpendOutcome {
        let mut tokens = self.lock();
        let key = (originator.to_string(), ResourceKey::Spending);
        let Some(token) = tokens.get_mut(&key) else {
            return SpendOutcome::Missing;
        };
        if token.is_expired_at(Utc::now()) {
            tracing::debug!(originator, token = %token.id, "evicting expired spending token");
            tokens.remove(&key);
            return SpendOutcome::Missing;
        }
        match charge(token, amount) {
            Ok(_) => SpendOutcome::Spent(token.clone()),
            Err(InsufficientLimit { available, .. }) => SpendOutcome::Insufficient { available },
        }
    }

    /// Snapshot of all live tokens.
    pub fn tokens(&self) -> Vec<PermissionToken> {
        let now = Utc::now();
        self.lock()
            .values()
            .filter(|token| !token.is_expired_at(now))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn charge(token: &mut PermissionToken, amount: u64) -> Result<u64, InsufficientLimit> {
    // A spending token without a recorded budget has nothing left to spend.
    let available = token.spending_limit.unwrap_or(0);
    let remaining = available.checked_sub(amount).ok_or(InsufficientLimit {
        requested: amount,
        available,
    })?;
    token.spending_limit = Some(remaining);
    Ok(remaining)
}
