//! Holder of the current access/refresh token pair.
//!
//! # Design
//! The authenticated client reads tokens through the `TokenStore` trait and
//! writes them only through `set_pair`/`clear`, so the pair is always
//! replaced wholesale. `MemoryTokenStore` keeps the pair behind one
//! `RwLock`, which means a reader sees either the old pair or the new one,
//! never an access token from one and a refresh token from the other.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Access and refresh token issued together by login, registration or
/// refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens are credentials; keep them out of logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("token store lock poisoned")]
    Poisoned,
    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError>;
    fn refresh_token(&self) -> Result<Option<String>, TokenStoreError>;
    /// Replace both tokens in one step.
    fn set_pair(&self, pair: TokenPair) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    pair: RwLock<Option<TokenPair>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair(pair: TokenPair) -> Self {
        Self {
            pair: RwLock::new(Some(pair)),
        }
    }

    /// Snapshot of the whole pair.
    pub fn pair(&self) -> Result<Option<TokenPair>, TokenStoreError> {
        self.pair
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| TokenStoreError::Poisoned)
    }
}

impl TokenStore for MemoryTokenStore {
    fn access_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.pair()?.map(|p| p.access_token))
    }

    fn refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.pair()?.map(|p| p.refresh_token))
    }

    fn set_pair(&self, pair: TokenPair) -> Result<(), TokenStoreError> {
        let mut guard = self.pair.write().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = Some(pair);
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        let mut guard = self.pair.write().map_err(|_| TokenStoreError::Poisoned)?;
        *guard = None;
        Ok(())
    }
}
