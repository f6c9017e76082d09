use std::sync::Arc;
use std::sync::Mutex;

/// Holds the bearer credential for one client session. In-memory only; a new
/// session starts unauthenticated, like a fresh page load.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    token: Arc<Mutex<Option<String>>>,
}

impl CredentialStore {
    pub fn set(&self, token: impl Into<String>) {
        let mut guard = self.token.lock().expect("credential lock");
        *guard = Some(token.into());
    }

    pub fn clear(&self) {
        let mut guard = self.token.lock().expect("credential lock");
        *guard = None;
    }

    pub fn current(&self) -> Option<String> {
        self.token.lock().expect("credential lock").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.lock().expect("credential lock").is_some()
    }
}
