//! Monkey driver - scripted control of NetSurf's monkey frontend.
//!
//! This library drives the `nsmonkey` binary: a headless NetSurf build
//! whose user interface is a newline-delimited text protocol on stdin
//! and stdout. The driver launches the process, mirrors everything the
//! frontend announces, and lets a test steer the browser and block on
//! outcomes.
//!
//! # Architecture
//!
//! The driver is a single-threaded state machine around a child process:
//!
//! - **Transport**: owns the child, frames stdout into lines, queues
//!   stdin writes
//! - **Session**: parses announcements into mirrors ([`Window`],
//!   [`CredentialPrompt`], [`CertificatePrompt`]) and exposes waits
//! - **Hooks**: login and certificate prompts answer themselves through
//!   installed policies, conservative by default
//!
//! Nothing runs in the background: state only advances while a wait
//! operation is pumping the transport, so a test always observes the
//! mirror between steps, never mid-update.
//!
//! # Quick Start
//!
//! ```no_run
//! use monkey_driver::{LogFilter, Result, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut session = Session::builder()
//!         .binary("/usr/bin/nsmonkey")
//!         .launch()
//!         .await?;
//!
//!     let window = session.new_window(None).await?;
//!     session.load_page(window, Some("https://example.com/")).await?;
//!     println!("title: {:?}", session.window(window)?.title());
//!
//!     let errors = LogFilter::new().level("ERROR");
//!     assert!(!session.log_contains(window, &errors)?);
//!
//!     session.quit_and_wait().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Mirrored entities: [`Window`], [`CredentialPrompt`], [`CertificatePrompt`] |
//! | [`session`] | Session lifecycle, event loop and wait operations |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | Wire command and announcement types |
//! | [`schedule`] | Monotonic timer queue for scripted actions |
//! | [`transport`] | Child process and line framing layer |
//!
//! # Features
//!
//! - **Deterministic**: single-threaded, no background tasks, bounded waits
//! - **Tolerant**: unknown announcements are logged and skipped, never fatal
//! - **Scriptable**: timers inject actions mid-wait for timeout and
//!   interruption tests
//! - **Inspectable**: the full wire transcript is kept for assertions

// ============================================================================
// Modules
// ============================================================================

/// Mirrored browser entities.
///
/// This module contains the driver-side images of frontend objects:
///
/// - [`Window`] - browser window with its attributes, console log and plots
/// - [`CredentialPrompt`] - login (401) prompt
/// - [`CertificatePrompt`] - certificate verification prompt
pub mod browser;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for frontend entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Wire protocol types.
///
/// Commands the driver sends and announcements it parses.
pub mod protocol;

/// Timer queue for scheduled actions.
///
/// Lets tests inject commands while a wait operation is blocking.
pub mod schedule;

/// Session lifecycle and operations.
///
/// Use [`Session::builder()`] to launch a configured frontend.
pub mod session;

/// Child process transport.
///
/// Internal module handling process lifetime and line framing.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{
    CertificateDecision, CertificatePrompt, CredentialDecision, CredentialPrompt, LogEntry,
    LogFilter, PlotCommand, Window,
};

// Session types
pub use session::{Session, SessionBuilder};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CertId, LoginId, WindowId};

// Protocol types surfaced by session operations
pub use protocol::RedrawArea;

// Scheduling types
pub use schedule::{Action, Scheduler};

// Transcript types
pub use transport::{Direction, TranscriptEntry};
