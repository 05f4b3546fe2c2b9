//! Credential store
//!
//! Holds the current [`Credentials`] snapshot. Readers take an `Arc` clone and never see
//! a half-updated pair; the refresher swaps in a whole new snapshot.

use edv_core::Credentials;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
pub struct CredentialStore {
    current: RwLock<Arc<Credentials>>,
}

impl CredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            current: RwLock::new(Arc::new(credentials)),
        }
    }

    /// The snapshot current at call time.
    pub fn snapshot(&self) -> Arc<Credentials> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole snapshot.
    pub fn replace(&self, credentials: Credentials) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(credentials);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(access: &str) -> Credentials {
        Credentials {
            access_token: access.to_string(),
            refresh_token: "refresh".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let store = CredentialStore::new(creds("first"));
        let before = store.snapshot();

        store.replace(creds("second"));

        assert_eq!(before.access_token, "first");
        assert_eq!(store.snapshot().access_token, "second");
    }
}
