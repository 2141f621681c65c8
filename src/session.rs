//! Session-scoped identity cache.
//!
//! Remembers the last identifiers the user typed so ceremony forms can be
//! pre-filled. Pure convenience state with last-writer-wins semantics:
//! never a credential, never a secret, never authoritative. The backing
//! store lives for one tab/session and is dropped with it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

const LOGIN_EMAIL_KEY: &str = "tally_email";
const PASSKEY_EMAIL_KEY: &str = "tally_passkey_email";

/// Key/value storage with session lifetime, mirroring the host's
/// session-storage contract.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store, used directly in native contexts and as the test
/// stand-in for a browser's session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

/// Pre-fill helper over a [`SessionStore`]. The one-time-code login email
/// and the passkey login email are remembered independently.
#[derive(Clone)]
pub struct IdentityCache {
    store: Arc<dyn SessionStore>,
}

impl IdentityCache {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::default()))
    }

    pub fn remember_login_email(&self, email: &str) {
        self.store.set(LOGIN_EMAIL_KEY, email);
    }

    pub fn remember_passkey_email(&self, email: &str) {
        self.store.set(PASSKEY_EMAIL_KEY, email);
    }

    pub fn last_login_email(&self) -> Option<String> {
        self.store.get(LOGIN_EMAIL_KEY)
    }

    pub fn last_passkey_email(&self) -> Option<String> {
        self.store.get(PASSKEY_EMAIL_KEY)
    }

    /// Drops both remembered identifiers, e.g. on logout.
    pub fn clear(&self) {
        self.store.remove(LOGIN_EMAIL_KEY);
        self.store.remove(PASSKEY_EMAIL_KEY);
    }
}
