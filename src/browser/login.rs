//! Login (401 authentication) prompt mirror.
//!
//! The frontend announces a prompt with `LOGIN OPEN`, then streams the
//! credentials it already holds as separate `USER` / `PASS` / `REALM`
//! notifications, in no guaranteed order. A prompt is *ready* once all
//! three have arrived at least once; only then does the session consult
//! the credential hook.

// ============================================================================
// Imports
// ============================================================================

use tracing::warn;

use crate::identifiers::LoginId;

// ============================================================================
// CredentialDecision
// ============================================================================

/// What a credential hook wants done with a ready prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialDecision {
    /// Fill in credentials and submit the prompt.
    ///
    /// A `None` field keeps the value the frontend supplied with the
    /// prompt, echoing it back unchanged.
    Submit {
        /// Username to send, or `None` to echo the prompt's value.
        username: Option<String>,
        /// Password to send, or `None` to echo the prompt's value.
        password: Option<String>,
    },
    /// Dismiss the prompt without authenticating.
    Dismiss,
}

// ============================================================================
// CredentialPrompt
// ============================================================================

/// Driver-side mirror of one login prompt.
#[derive(Debug, Clone)]
pub struct CredentialPrompt {
    id: LoginId,
    url: String,
    username: Option<String>,
    password: Option<String>,
    realm: Option<String>,
    alive: bool,
}

impl CredentialPrompt {
    /// Creates a mirror from a `LOGIN OPEN` announcement.
    pub(crate) fn new(id: LoginId, url: String) -> Self {
        Self {
            id,
            url,
            username: None,
            password: None,
            realm: None,
            alive: true,
        }
    }

    /// Records the username the frontend supplied.
    pub(crate) fn set_username(&mut self, username: String) {
        if !self.alive {
            warn!(login = %self.id, "Dropping username for destroyed login prompt");
            return;
        }
        self.username = Some(username);
    }

    /// Records the password the frontend supplied.
    pub(crate) fn set_password(&mut self, password: String) {
        if !self.alive {
            warn!(login = %self.id, "Dropping password for destroyed login prompt");
            return;
        }
        self.password = Some(password);
    }

    /// Records the authentication realm.
    pub(crate) fn set_realm(&mut self, realm: String) {
        if !self.alive {
            warn!(login = %self.id, "Dropping realm for destroyed login prompt");
            return;
        }
        self.realm = Some(realm);
    }

    /// Marks the prompt destroyed.
    pub(crate) fn destroy(&mut self) {
        if !self.alive {
            warn!(login = %self.id, "Duplicate destroy for login prompt");
            return;
        }
        self.alive = false;
    }

    /// Returns the frontend-assigned identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> LoginId {
        self.id
    }

    /// Returns the URL that demanded authentication.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the last username the frontend announced.
    #[inline]
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the last password the frontend announced.
    #[inline]
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the authentication realm, once announced.
    #[inline]
    #[must_use]
    pub fn realm(&self) -> Option<&str> {
        self.realm.as_deref()
    }

    /// Returns `false` once the frontend has destroyed the prompt.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Returns `true` once username, password and realm have all arrived.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.username.is_some() && self.password.is_some() && self.realm.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
