use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::modules::report_client::session_store::SessionStore;
use crate::shared::constants::DEFAULT_SESSION_NAMESPACE;

/// Session-local record of consumed tokens and report-to-token bindings.
///
/// Keys are `<ns>:token:<token>` (ISO timestamp) and `<ns>:report:<id>`
/// (token). This only deters duplicate submissions from one session; the
/// server's conditional update is what enforces single use.
pub struct ReplayGuard<S: SessionStore> {
    store: S,
    namespace: String,
}

impl<S: SessionStore> ReplayGuard<S> {
    pub fn new(store: S) -> Self {
        Self::with_namespace(store, DEFAULT_SESSION_NAMESPACE)
    }

    pub fn with_namespace(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    fn token_key(&self, token: &str) -> String {
        format!("{}:token:{}", self.namespace, token)
    }

    fn report_key(&self, report_id: Uuid) -> String {
        format!("{}:report:{}", self.namespace, report_id)
    }

    pub fn is_used(&self, token: &str) -> bool {
        self.store.get(&self.token_key(token)).is_some()
    }

    pub fn used_at(&self, token: &str) -> Option<DateTime<Utc>> {
        self.store
            .get(&self.token_key(token))
            .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn mark_used(&self, token: &str, at: DateTime<Utc>) {
        self.store.set(&self.token_key(token), at.to_rfc3339());
    }

    /// Forgets a used marker, for submissions the server rejected as invalid
    pub fn release(&self, token: &str) {
        self.store.remove(&self.token_key(token));
    }

    pub fn associate(&self, report_id: Uuid, token: &str) {
        self.store.set(&self.report_key(report_id), token.to_string());
    }

    pub fn lookup_token(&self, report_id: Uuid) -> Option<String> {
        self.store.get(&self.report_key(report_id))
    }

    /// Removes every entry under this namespace and nothing else
    pub fn clear_all(&self) {
        let prefix = format!("{}:", self.namespace);
        for key in self.store.keys() {
            if key.starts_with(&prefix) {
                self.store.remove(&key);
            }
        }
    }
}
