use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Session-scoped key-value storage available to the report client.
///
/// Entries live as long as the session and are never sent to the server.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-process session storage
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries().keys().cloned().collect()
    }
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}
