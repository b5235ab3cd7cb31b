//! Error types for the monkey driver.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use monkey_driver::{Result, Session};
//!
//! async fn example(session: &mut Session) -> Result<()> {
//!     let win = session.new_window(Some("about:blank")).await?;
//!     session.close_window(win).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::BinaryNotFound`] |
//! | Process | [`Error::Launch`], [`Error::UnexpectedExit`], [`Error::ChannelClosed`] |
//! | Window | [`Error::WindowNotFound`], [`Error::WindowDestroyed`] |
//! | Login | [`Error::LoginNotFound`], [`Error::LoginDestroyed`] |
//! | Certificate | [`Error::CertNotFound`], [`Error::CertDestroyed`] |
//! | Query | [`Error::EmptyLogFilter`] |
//! | External | [`Error::Io`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::{CertId, LoginId, WindowId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when session configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Monkey binary not found at path.
    ///
    /// Returned when the specified frontend binary does not exist.
    #[error("Monkey binary not found at: {path}")]
    BinaryNotFound {
        /// Path where the binary was expected.
        path: PathBuf,
    },

    // ========================================================================
    // Process Errors
    // ========================================================================
    /// Failed to launch the monkey process.
    ///
    /// Returned when the frontend process fails to start.
    #[error("Failed to launch monkey: {message}")]
    Launch {
        /// Description of the launch failure.
        message: String,
    },

    /// Channel to the monkey process is closed.
    ///
    /// Returned when an operation needs the child but its stdio has
    /// already shut down.
    #[error("Channel closed")]
    ChannelClosed,

    /// The monkey process exited before it was told to quit.
    ///
    /// Returned when the exit event arrives while the session still
    /// expects the process to be running.
    #[error("Monkey exited unexpectedly with code {code}")]
    UnexpectedExit {
        /// Exit code; negative when the process died to a signal.
        code: i32,
    },

    // ========================================================================
    // Window Errors
    // ========================================================================
    /// Window not found.
    ///
    /// Returned when a window ID was never announced by the frontend.
    #[error("Window not found: {window_id}")]
    WindowNotFound {
        /// The missing window ID.
        window_id: WindowId,
    },

    /// Window already destroyed.
    ///
    /// Returned when an operation targets a window whose `DESTROY`
    /// notification has been processed.
    #[error("Window already destroyed: {window_id}")]
    WindowDestroyed {
        /// The destroyed window ID.
        window_id: WindowId,
    },

    // ========================================================================
    // Login Errors
    // ========================================================================
    /// Login prompt not found.
    ///
    /// Returned when a login ID was never announced by the frontend.
    #[error("Login prompt not found: {login_id}")]
    LoginNotFound {
        /// The missing login ID.
        login_id: LoginId,
    },

    /// Login prompt already destroyed.
    #[error("Login prompt already destroyed: {login_id}")]
    LoginDestroyed {
        /// The destroyed login ID.
        login_id: LoginId,
    },

    // ========================================================================
    // Certificate Errors
    // ========================================================================
    /// Certificate prompt not found.
    ///
    /// Returned when a certificate ID was never announced by the frontend.
    #[error("Certificate prompt not found: {cert_id}")]
    CertNotFound {
        /// The missing certificate ID.
        cert_id: CertId,
    },

    /// Certificate prompt already destroyed.
    #[error("Certificate prompt already destroyed: {cert_id}")]
    CertDestroyed {
        /// The destroyed certificate ID.
        cert_id: CertId,
    },

    // ========================================================================
    // Query Errors
    // ========================================================================
    /// Log filter has no criteria.
    ///
    /// Returned when a console-log query would match every entry.
    #[error("Log filter has no criteria")]
    EmptyLogFilter,

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a binary not found error.
    #[inline]
    pub fn binary_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BinaryNotFound { path: path.into() }
    }

    /// Creates a launch error.
    #[inline]
    pub fn launch(err: IoError) -> Self {
        Self::Launch {
            message: err.to_string(),
        }
    }

    /// Creates an unexpected exit error.
    #[inline]
    pub fn unexpected_exit(code: i32) -> Self {
        Self::UnexpectedExit { code }
    }

    /// Creates a window not found error.
    #[inline]
    pub fn window_not_found(window_id: WindowId) -> Self {
        Self::WindowNotFound { window_id }
    }

    /// Creates a window destroyed error.
    #[inline]
    pub fn window_destroyed(window_id: WindowId) -> Self {
        Self::WindowDestroyed { window_id }
    }

    /// Creates a login prompt not found error.
    #[inline]
    pub fn login_not_found(login_id: LoginId) -> Self {
        Self::LoginNotFound { login_id }
    }

    /// Creates a login prompt destroyed error.
    #[inline]
    pub fn login_destroyed(login_id: LoginId) -> Self {
        Self::LoginDestroyed { login_id }
    }

    /// Creates a certificate prompt not found error.
    #[inline]
    pub fn cert_not_found(cert_id: CertId) -> Self {
        Self::CertNotFound { cert_id }
    }

    /// Creates a certificate prompt destroyed error.
    #[inline]
    pub fn cert_destroyed(cert_id: CertId) -> Self {
        Self::CertDestroyed { cert_id }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error means the session cannot continue.
    ///
    /// Fatal errors leave the event loop unusable; everything else is a
    /// caller-side mistake that the session survives.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Launch { .. } | Self::ChannelClosed | Self::UnexpectedExit { .. } | Self::Io(_)
        )
    }

    /// Returns `true` if this is an unknown-identifier error.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::WindowNotFound { .. } | Self::LoginNotFound { .. } | Self::CertNotFound { .. }
        )
    }

    /// Returns `true` if this is a dead-entity error.
    ///
    /// The identifier was valid once; its `DESTROY` has since been
    /// processed.
    #[inline]
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        matches!(
            self,
            Self::WindowDestroyed { .. }
                | Self::LoginDestroyed { .. }
                | Self::CertDestroyed { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
