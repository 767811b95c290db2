//! Session collaborator contract.
//!
//! # Responsibility
//! - Abstract credential storage behind an injected collaborator.
//! - Give core code one hook to invalidate a rejected credential.
//!
//! # Invariants
//! - Core code never inspects credential contents.
//! - Authorization failures are delegated to `Session::invalidate`.

use log::info;
use std::cell::{Cell, RefCell};

/// Credential holder supplied by the embedding application.
pub trait Session {
    /// Current credential, if signed in.
    fn credential(&self) -> Option<String>;
    fn set_credential(&self, credential: String);
    fn clear(&self);

    /// Called after the Task Service rejected the current credential.
    fn invalidate(&self) {
        info!("event=session_invalidate module=session status=ok");
        self.clear();
    }
}

/// In-process session holder.
#[derive(Debug, Default)]
pub struct MemorySession {
    credential: RefCell<Option<String>>,
    invalidations: Cell<u32>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(credential: impl Into<String>) -> Self {
        let session = Self::default();
        session.set_credential(credential.into());
        session
    }

    /// Number of times `invalidate` was called.
    pub fn invalidation_count(&self) -> u32 {
        self.invalidations.get()
    }
}

impl Session for MemorySession {
    fn credential(&self) -> Option<String> {
        self.credential.borrow().clone()
    }

    fn set_credential(&self, credential: String) {
        self.credential.replace(Some(credential));
    }

    fn clear(&self) {
        self.credential.replace(None);
    }

    fn invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
        info!("event=session_invalidate module=session status=ok");
        self.clear();
    }
}

impl<S: Session + ?Sized> Session for &S {
    fn credential(&self) -> Option<String> {
        (**self).credential()
    }

    fn set_credential(&self, credential: String) {
        (**self).set_credential(credential)
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn invalidate(&self) {
        (**self).invalidate()
    }
}

#[cfg(test)]
mod tests {
    use super::{MemorySession, Session};

    #[test]
    fn invalidate_clears_credential_and_counts() {
        let session = MemorySession::signed_in("token-a");
        assert_eq!(session.credential().as_deref(), Some("token-a"));

        session.invalidate();
        assert!(session.credential().is_none());
        assert_eq!(session.invalidation_count(), 1);
    }
}
