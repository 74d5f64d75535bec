use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ChatError;
use crate::provider::Provider;

/// Key-value storage for per-provider API keys.
///
/// Absence is a valid state and means "chat disabled" for that provider.
/// The core never touches a storage medium directly; callers inject an
/// implementation of this trait and resolve keys through it before opening a
/// session.
pub trait CredentialStore: Send + Sync {
    /// The stored key for a provider, if any.
    fn get(&self, provider: Provider) -> Option<String>;

    /// Store or replace the key for a provider.
    fn set(&self, provider: Provider, key: String);

    /// Remove the key for a provider.
    fn clear(&self, provider: Provider);
}

/// Resolve a key or refuse before any network call is attempted.
pub fn require_key(store: &dyn CredentialStore, provider: Provider) -> Result<String, ChatError> {
    store
        .get(provider)
        .filter(|key| !key.is_empty())
        .ok_or(ChatError::MissingApiKey(provider))
}

/// In-process credential store; doubles as the test fake.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    keys: Mutex<HashMap<Provider, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, provider: Provider) -> Option<String> {
        self.keys
            .lock()
            .expect("credential store lock poisoned")
            .get(&provider)
            .cloned()
    }

    fn set(&self, provider: Provider, key: String) {
        self.keys
            .lock()
            .expect("credential store lock poisoned")
            .insert(provider, key);
    }

    fn clear(&self, provider: Provider) {
        self.keys
            .lock()
            .expect("credential store lock poisoned")
            .remove(&provider);
    }
}
