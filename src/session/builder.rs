//! Builder pattern for session configuration.
//!
//! Provides a fluent API for configuring and launching [`Session`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use monkey_driver::Session;
//!
//! # async fn example() -> monkey_driver::Result<()> {
//! let session = Session::builder()
//!     .binary("/usr/bin/nsmonkey")
//!     .arg("-v")
//!     .launch()
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;
use tracing::info;

use crate::error::{Error, Result};
use crate::transport::Transport;

use super::core::Session;

// ============================================================================
// Constants
// ============================================================================

/// How long to wait for the startup announcement.
const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(1);

/// Startup wait when running under a wrapper such as valgrind.
const WRAPPED_STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SessionBuilder
// ============================================================================

/// Builder for configuring a [`Session`] instance.
///
/// Use [`Session::builder()`] to create a new builder.
#[derive(Debug, Default, Clone)]
pub struct SessionBuilder {
    /// Path to the monkey binary.
    binary: Option<PathBuf>,
    /// Arguments passed to the binary.
    args: Vec<String>,
    /// Wrapper command prepended to the argv, e.g. valgrind.
    wrapper: Vec<String>,
    /// Working directory for the child.
    working_dir: Option<PathBuf>,
    /// Override for the startup handshake wait.
    startup_timeout: Option<Duration>,
}

// ============================================================================
// SessionBuilder Implementation
// ============================================================================

impl SessionBuilder {
    /// Creates a new session builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path to the monkey binary executable.
    #[inline]
    #[must_use]
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Appends one argument to the child's command line.
    #[inline]
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments to the child's command line.
    #[must_use]
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Prefixes the launch with a wrapper command, e.g.
    /// `["valgrind", "--leak-check=full"]`.
    ///
    /// A wrapper slows startup considerably, so the default startup
    /// timeout rises from one second to ten.
    #[must_use]
    pub fn wrapper<I>(mut self, wrapper: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.wrapper = wrapper.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the child's working directory.
    #[inline]
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Overrides how long to wait for the startup announcement.
    #[inline]
    #[must_use]
    pub fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = Some(timeout);
        self
    }

    /// Launches the frontend and waits for it to announce startup.
    ///
    /// A frontend that never announces startup is tolerated (the session
    /// comes back with [`Session::is_started`] still false); a frontend
    /// that cannot be spawned, or that exits before announcing, is not.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no binary is set
    /// - [`Error::BinaryNotFound`] if the binary path doesn't exist
    /// - [`Error::Launch`] if spawning the process fails
    /// - [`Error::UnexpectedExit`] if the child exits during the handshake
    pub async fn launch(self) -> Result<Session> {
        let binary = self.validate_binary()?;
        let timeout = self.effective_startup_timeout();

        let mut command = match self.wrapper.split_first() {
            Some((head, rest)) => {
                let mut command = Command::new(head);
                command.args(rest);
                command.arg(&binary);
                command
            }
            None => Command::new(&binary),
        };
        command.args(&self.args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        info!(
            binary = %binary.display(),
            wrapped = !self.wrapper.is_empty(),
            "Launching monkey"
        );
        let transport = Transport::spawn(command)?;
        Session::start(transport, timeout).await
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SessionBuilder {
    /// Validates the binary path configuration.
    fn validate_binary(&self) -> Result<PathBuf> {
        let binary = self.binary.clone().ok_or_else(|| {
            Error::config(
                "Monkey binary path is required. Use .binary() to set it.\n\
                 Example: Session::builder().binary(\"/usr/bin/nsmonkey\")",
            )
        })?;

        if !binary.exists() {
            return Err(Error::binary_not_found(&binary));
        }

        Ok(binary)
    }

    /// Resolves the startup timeout from the override and the wrapper.
    fn effective_startup_timeout(&self) -> Duration {
        if let Some(timeout) = self.startup_timeout {
            return timeout;
        }
        if self.wrapper.is_empty() {
            DEFAULT_STARTUP_TIMEOUT
        } else {
            WRAPPED_STARTUP_TIMEOUT
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
