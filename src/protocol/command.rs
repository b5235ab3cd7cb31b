//! Outbound command messages.
//!
//! Commands are the driver-to-frontend half of the protocol. Each variant
//! carries exactly the fields its wire form needs; [`Command::encode`]
//! produces the line text without the terminating newline.
//!
//! # Command Families
//!
//! | Family | Commands |
//! |--------|----------|
//! | global | `OPTIONS`, `QUIT` |
//! | `WINDOW` | `NEW`, `GO`, `STOP`, `RELOAD`, `DESTROY`, `EXEC`, `REDRAW` |
//! | `LOGIN` | `USERNAME`, `PASSWORD`, `GO`, `DESTROY` |
//! | `SSLCERT` | `GO`, `DESTROY` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::identifiers::{CertId, LoginId, WindowId};

// ============================================================================
// RedrawArea
// ============================================================================

/// Region of a window to capture in a redraw cycle.
///
/// Coordinates are in the frontend's plot space: top-left inclusive,
/// bottom-right exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedrawArea {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge.
    pub x1: i32,
    /// Bottom edge.
    pub y1: i32,
}

impl RedrawArea {
    /// Creates a capture region.
    #[inline]
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

// ============================================================================
// Command
// ============================================================================

/// One outbound protocol command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Pass frontend option strings through verbatim.
    ///
    /// Only meaningful before any window exists. Callers skip sending
    /// when the list is empty; the wire has no zero-option form.
    Options {
        /// Option strings, passed through unmodified.
        options: Vec<String>,
    },

    /// Request graceful shutdown.
    Quit,

    /// Open a window, optionally navigating it immediately.
    WindowNew {
        /// URL to load, or `None` for a blank window.
        url: Option<String>,
    },

    /// Navigate a window.
    WindowGo {
        /// Target window.
        window: WindowId,
        /// URL to load.
        url: String,
        /// Optional referer URL.
        referer: Option<String>,
    },

    /// Stop a window's current load.
    WindowStop {
        /// Target window.
        window: WindowId,
    },

    /// Reload a window's current page.
    WindowReload {
        /// Target window.
        window: WindowId,
    },

    /// Ask the frontend to destroy a window.
    WindowDestroy {
        /// Target window.
        window: WindowId,
    },

    /// Execute script source in a window's page context.
    WindowExec {
        /// Target window.
        window: WindowId,
        /// Script source; free text, spaces preserved.
        source: String,
    },

    /// Begin a draw-capture cycle.
    WindowRedraw {
        /// Target window.
        window: WindowId,
        /// Region to capture, or `None` for the whole window.
        area: Option<RedrawArea>,
    },

    /// Supply the username for a credential prompt.
    LoginUsername {
        /// Target prompt.
        login: LoginId,
        /// Username value.
        username: String,
    },

    /// Supply the password for a credential prompt.
    LoginPassword {
        /// Target prompt.
        login: LoginId,
        /// Password value.
        password: String,
    },

    /// Submit a credential prompt.
    LoginGo {
        /// Target prompt.
        login: LoginId,
    },

    /// Dismiss a credential prompt without submitting.
    LoginDestroy {
        /// Target prompt.
        login: LoginId,
    },

    /// Accept the certificate a prompt is asking about.
    CertGo {
        /// Target prompt.
        cert: CertId,
    },

    /// Reject the certificate a prompt is asking about.
    CertDestroy {
        /// Target prompt.
        cert: CertId,
    },
}

impl Command {
    /// Renders the wire form of this command, without the newline.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Options { options } => format!("OPTIONS {}", options.join(" ")),
            Self::Quit => "QUIT".to_owned(),
            Self::WindowNew { url: None } => "WINDOW NEW".to_owned(),
            Self::WindowNew { url: Some(url) } => format!("WINDOW NEW {url}"),
            Self::WindowGo {
                window,
                url,
                referer: None,
            } => format!("WINDOW GO {window} {url}"),
            Self::WindowGo {
                window,
                url,
                referer: Some(referer),
            } => format!("WINDOW GO {window} {url} {referer}"),
            Self::WindowStop { window } => format!("WINDOW STOP {window}"),
            Self::WindowReload { window } => format!("WINDOW RELOAD {window}"),
            Self::WindowDestroy { window } => format!("WINDOW DESTROY {window}"),
            Self::WindowExec { window, source } => format!("WINDOW EXEC WIN {window} {source}"),
            Self::WindowRedraw { window, area: None } => format!("WINDOW REDRAW {window}"),
            Self::WindowRedraw {
                window,
                area: Some(area),
            } => format!(
                "WINDOW REDRAW {window} {} {} {} {}",
                area.x0, area.y0, area.x1, area.y1
            ),
            Self::LoginUsername { login, username } => format!("LOGIN USERNAME {login} {username}"),
            Self::LoginPassword { login, password } => format!("LOGIN PASSWORD {login} {password}"),
            Self::LoginGo { login } => format!("LOGIN GO {login}"),
            Self::LoginDestroy { login } => format!("LOGIN DESTROY {login}"),
            Self::CertGo { cert } => format!("SSLCERT GO {cert}"),
            Self::CertDestroy { cert } => format!("SSLCERT DESTROY {cert}"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// ============================================================================
// Tests
// ============================================================================
