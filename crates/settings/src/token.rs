//! The map SDK access token: validation, persistence and the provider the
//! page asks for it.

use std::collections::BTreeMap;

use crate::SettingsError;

/// Storage key of the persisted token.
pub const TOKEN_STORAGE_KEY: &str = "mapbox-token";

/// Prefix of public (browser-safe) access tokens.
pub const PUBLIC_TOKEN_PREFIX: &str = "pk.";

/// A token that passed the format check.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Trims `raw` and checks it is a public token.
    pub fn parse(raw: &str) -> Result<Self, SettingsError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(SettingsError::InvalidToken("token is empty".to_string()));
        }
        if !raw.starts_with(PUBLIC_TOKEN_PREFIX) || raw.len() == PUBLIC_TOKEN_PREFIX.len() {
            return Err(SettingsError::InvalidToken(format!(
                "expected a public token starting with \"{PUBLIC_TOKEN_PREFIX}\""
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken({PUBLIC_TOKEN_PREFIX}…)")
    }
}

/// Client-side key/value storage holding the token.
pub trait TokenStore {
    fn load(&self) -> Result<Option<String>, SettingsError>;
    fn save(&mut self, value: &str) -> Result<(), SettingsError>;
    fn remove(&mut self) -> Result<(), SettingsError>;
    /// Wipes every key of the underlying storage, not just the token.
    fn clear_all(&mut self) -> Result<(), SettingsError>;
}

#[derive(Debug)]
pub struct InMemoryTokenStore {
    key: String,
    entries: BTreeMap<String, String>,
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new(TOKEN_STORAGE_KEY)
    }
}

impl InMemoryTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Seeds an arbitrary key, e.g. state written by other parts of the page.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        Ok(self.entries.get(&self.key).cloned())
    }

    fn save(&mut self, value: &str) -> Result<(), SettingsError> {
        self.entries.insert(self.key.clone(), value.to_string());
        Ok(())
    }

    fn remove(&mut self) -> Result<(), SettingsError> {
        self.entries.remove(&self.key);
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), SettingsError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{SettingsError, TokenStore};

    #[derive(Debug)]
    pub struct LocalStorageTokenStore {
        key: String,
    }

    impl LocalStorageTokenStore {
        pub fn new(key: impl Into<String>) -> Result<Self, SettingsError> {
            // Fail early when storage is disabled (private mode, sandboxed iframe).
            window_local_storage()?;
            Ok(Self { key: key.into() })
        }
    }

    impl TokenStore for LocalStorageTokenStore {
        fn load(&self) -> Result<Option<String>, SettingsError> {
            window_local_storage()?
                .get_item(&self.key)
                .map_err(|e| SettingsError::Io(format!("get_item(token) failed: {:?}", e)))
        }

        fn save(&mut self, value: &str) -> Result<(), SettingsError> {
            window_local_storage()?
                .set_item(&self.key, value)
                .map_err(|e| SettingsError::Io(format!("set_item(token) failed: {:?}", e)))
        }

        fn remove(&mut self) -> Result<(), SettingsError> {
            window_local_storage()?
                .remove_item(&self.key)
                .map_err(|e| SettingsError::Io(format!("remove_item(token) failed: {:?}", e)))
        }

        fn clear_all(&mut self) -> Result<(), SettingsError> {
            window_local_storage()?
                .clear()
                .map_err(|e| SettingsError::Io(format!("clear failed: {:?}", e)))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, SettingsError> {
        let win = web_sys::window().ok_or(SettingsError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| SettingsError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(SettingsError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageTokenStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageTokenStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageTokenStore {
    pub fn new(_key: impl Into<String>) -> Result<Self, SettingsError> {
        Err(SettingsError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Result<Option<String>, SettingsError> {
        Err(SettingsError::StorageUnavailable)
    }

    fn save(&mut self, _value: &str) -> Result<(), SettingsError> {
        Err(SettingsError::StorageUnavailable)
    }

    fn remove(&mut self) -> Result<(), SettingsError> {
        Err(SettingsError::StorageUnavailable)
    }

    fn clear_all(&mut self) -> Result<(), SettingsError> {
        Err(SettingsError::StorageUnavailable)
    }
}

/// What the page should show after looking for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    Ready(AccessToken),
    /// Show the token prompt instead of the map; `rejected` explains why a
    /// stored token was discarded.
    Prompt { rejected: Option<String> },
}

/// Owns the token for the lifetime of the page.
#[derive(Debug)]
pub struct TokenProvider<S> {
    store: S,
    token: Option<AccessToken>,
}

impl<S: TokenStore> TokenProvider<S> {
    pub fn new(store: S) -> Self {
        Self { store, token: None }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Reads the stored token. A stored value failing the format check is
    /// removed so the user is prompted again; an unreadable store also ends at
    /// the prompt.
    pub fn init(&mut self) -> TokenState {
        self.token = None;
        let raw = match self.store.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return TokenState::Prompt { rejected: None },
            Err(err) => {
                tracing::warn!(%err, "could not read stored access token");
                return TokenState::Prompt {
                    rejected: Some(err.to_string()),
                };
            }
        };
        match AccessToken::parse(&raw) {
            Ok(token) => {
                self.token = Some(token.clone());
                TokenState::Ready(token)
            }
            Err(err) => {
                tracing::warn!(%err, "discarding stored access token");
                if let Err(remove_err) = self.store.remove() {
                    tracing::warn!(err = %remove_err, "could not remove stored access token");
                }
                TokenState::Prompt {
                    rejected: Some(err.to_string()),
                }
            }
        }
    }

    /// Validates and persists a token typed by the user.
    pub fn submit(&mut self, raw: &str) -> Result<AccessToken, SettingsError> {
        let token = AccessToken::parse(raw)?;
        self.store.save(token.as_str())?;
        tracing::info!("access token saved");
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Forgets the token; the page goes back to the prompt.
    pub fn reset(&mut self) -> Result<(), SettingsError> {
        self.store.remove()?;
        self.token = None;
        Ok(())
    }

    /// Escape hatch: wipes all local state.
    pub fn clear_all(&mut self) -> Result<(), SettingsError> {
        self.store.clear_all()?;
        self.token = None;
        tracing::warn!("cleared all local storage");
        Ok(())
    }
}
