//! TLS certificate verification prompt mirror.
//!
//! Unlike login prompts these carry no staged state: the frontend
//! announces the prompt with the offending URL and waits for the driver
//! to accept or reject the certificate chain.

// ============================================================================
// Imports
// ============================================================================

use tracing::warn;

use crate::identifiers::CertId;

// ============================================================================
// CertificateDecision
// ============================================================================

/// What a certificate hook wants done with a verification prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateDecision {
    /// Trust the certificate chain and continue the fetch.
    Accept,
    /// Abort the fetch.
    Reject,
}

// ============================================================================
// CertificatePrompt
// ============================================================================

/// Driver-side mirror of one certificate verification prompt.
#[derive(Debug, Clone)]
pub struct CertificatePrompt {
    id: CertId,
    url: String,
    alive: bool,
}

impl CertificatePrompt {
    /// Creates a mirror from an `SSLCERT VERIFY` announcement.
    pub(crate) fn new(id: CertId, url: String) -> Self {
        Self {
            id,
            url,
            alive: true,
        }
    }

    /// Marks the prompt destroyed.
    pub(crate) fn destroy(&mut self) {
        if !self.alive {
            warn!(cert = %self.id, "Duplicate destroy for certificate prompt");
            return;
        }
        self.alive = false;
    }

    /// Returns the frontend-assigned identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> CertId {
        self.id
    }

    /// Returns the URL whose certificate failed verification.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `false` once the frontend has destroyed the prompt.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

// ============================================================================
// Tests
// ============================================================================
