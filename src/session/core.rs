//! Session state and notification dispatch.
//!
//! The [`Session`] is the crate's hub: it owns the transport, the timer
//! queue and the mirrors of every entity the frontend has announced, and
//! it knows how to fold one inbound notification into that state. It is
//! strictly single-threaded; every operation takes `&mut self` and runs
//! between steps of the event loop in [`super::event_loop`].
//!
//! # Drop Policy
//!
//! Inbound lines that do not fit are handled by severity:
//!
//! | Line | Handling |
//! |------|----------|
//! | unknown family | dropped silently (other tooling shares the stream) |
//! | known family, unknown sub-action | dropped at trace level |
//! | notification for an unknown entity | dropped with a warning |
//! | known family, unparseable arguments | dropped with a warning |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::browser::{
    CertificateDecision, CertificatePrompt, CredentialDecision, CredentialPrompt, Window,
};
use crate::error::{Error, Result};
use crate::identifiers::{CertId, LoginId, WindowId};
use crate::protocol::{CertAction, Command, GenericEvent, LoginAction, Notification, WindowAction};
use crate::schedule::Scheduler;
use crate::transport::{Transport, TranscriptEntry};

use super::builder::SessionBuilder;

// ============================================================================
// Hook Types
// ============================================================================

/// Decides what to do with a login prompt that has become ready.
pub(crate) type CredentialHook = Box<dyn Fn(&CredentialPrompt) -> CredentialDecision>;

/// Decides what to do with a certificate verification prompt.
pub(crate) type CertificateHook = Box<dyn Fn(&CertificatePrompt) -> CertificateDecision>;

// ============================================================================
// Session
// ============================================================================

/// A running monkey frontend and everything known about it.
///
/// Created with [`Session::builder`]. All interaction is blocking from
/// the caller's point of view: operations send commands and then drive
/// the event loop until the frontend's answer shows up in the mirrors.
pub struct Session {
    /// Line channel to the child process.
    pub(crate) transport: Transport,
    /// Deadline-ordered timer queue.
    pub(crate) scheduler: Scheduler<Session>,
    /// Window mirrors, live and destroyed, by frontend id.
    pub(crate) windows: FxHashMap<WindowId, Window>,
    /// Login prompt mirrors by frontend id.
    pub(crate) logins: FxHashMap<LoginId, CredentialPrompt>,
    /// Certificate prompt mirrors by frontend id.
    pub(crate) certs: FxHashMap<CertId, CertificatePrompt>,
    /// URL echoed by the frontend at launch, once seen.
    pub(crate) launch_url: Option<String>,
    /// Window currently receiving `PLOT` lines, while a redraw runs.
    pub(crate) draw_target: Option<WindowId>,
    /// Set once `GENERIC STARTED` has been seen.
    pub(crate) started: bool,
    /// Set once `GENERIC FINISHED` has been seen; the frontend exiting
    /// is expected from then on.
    pub(crate) stopped: bool,
    /// Set once the driver has sent `QUIT`.
    pub(crate) quit_sent: bool,
    /// Policy for ready login prompts.
    pub(crate) credential_hook: CredentialHook,
    /// Policy for certificate prompts.
    pub(crate) certificate_hook: CertificateHook,
}

impl Session {
    /// Returns a builder for launching a new session.
    #[inline]
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Wraps a freshly spawned transport and performs the startup
    /// handshake.
    ///
    /// Missing the `GENERIC STARTED` announcement within `startup_timeout`
    /// is tolerated with a warning; the child exiting during the handshake
    /// is not.
    pub(crate) async fn start(transport: Transport, startup_timeout: Duration) -> Result<Self> {
        let mut session = Self {
            transport,
            scheduler: Scheduler::new(),
            windows: FxHashMap::default(),
            logins: FxHashMap::default(),
            certs: FxHashMap::default(),
            launch_url: None,
            draw_target: None,
            started: false,
            stopped: false,
            quit_sent: false,
            credential_hook: Box::new(|_| CredentialDecision::Dismiss),
            certificate_hook: Box::new(|_| CertificateDecision::Reject),
        };

        if !session
            .wait_until(|s: &Session| s.is_started(), Some(startup_timeout))
            .await?
        {
            warn!("Monkey did not announce startup in time");
        }
        Ok(session)
    }
}

// ============================================================================
// Session - Commands and Lifecycle
// ============================================================================

impl Session {
    /// Encodes and queues one command for the frontend.
    pub(crate) fn send(&mut self, command: &Command) -> Result<()> {
        self.transport.send_line(&command.encode())
    }

    /// Passes frontend option strings, e.g. `enable_javascript:1`.
    ///
    /// An empty set sends nothing.
    pub fn pass_options<I>(&mut self, options: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        if options.is_empty() {
            return Ok(());
        }
        self.send(&Command::Options { options })
    }

    /// Asks the frontend to shut down.
    ///
    /// The exit only becomes expected once the frontend answers with
    /// `GENERIC FINISHED`; a channel that closes before that is still an
    /// error. Calling this again is a no-op.
    pub fn quit(&mut self) -> Result<()> {
        if self.quit_sent {
            return Ok(());
        }
        self.send(&Command::Quit)?;
        self.quit_sent = true;
        debug!("Quit sent");
        Ok(())
    }

    /// Returns `true` once the frontend has announced startup.
    #[inline]
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Returns `true` once the frontend has announced a clean shutdown.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Returns the URL the frontend was launched with, once echoed.
    #[inline]
    #[must_use]
    pub fn launch_url(&self) -> Option<&str> {
        self.launch_url.as_deref()
    }

    /// Returns the child's exit code, once it has exited.
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        self.transport.exit_code()
    }

    /// Returns every protocol line sent or received, oldest first.
    #[inline]
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        self.transport.transcript()
    }
}

// ============================================================================
// Session - Dispatch
// ============================================================================

impl Session {
    /// Folds one inbound line into the session state.
    ///
    /// Only exit announcements can fail; everything else that does not
    /// fit is dropped per the module-level policy.
    pub(crate) fn dispatch(&mut self, line: &str) -> Result<()> {
        match Notification::parse(line) {
            Notification::Generic(event) => self.on_generic(event),
            Notification::Window { window, action } => {
                self.on_window(window, action);
                Ok(())
            }
            Notification::Login { login, action } => {
                self.on_login(login, action);
                Ok(())
            }
            Notification::SslCert { cert, action } => {
                self.on_sslcert(cert, action);
                Ok(())
            }
            Notification::Plot { tokens } => {
                self.on_plot(tokens);
                Ok(())
            }
            Notification::Unknown { .. } => Ok(()),
            Notification::Malformed { line } => {
                warn!(line = %line, "Dropping malformed notification");
                Ok(())
            }
        }
    }

    /// Handles the channel reaching end-of-stream.
    ///
    /// Before the frontend has reported `FINISHED` this is a crash;
    /// after, a zero exit is silence and a nonzero exit is worth a
    /// warning but not an error.
    pub(crate) fn on_transport_closed(&mut self, exit_code: i32) -> Result<()> {
        if !self.stopped {
            return Err(Error::unexpected_exit(exit_code));
        }
        if exit_code != 0 {
            warn!(exit_code, "Monkey exited nonzero after reporting finished");
        }
        Ok(())
    }

    fn on_generic(&mut self, event: GenericEvent) -> Result<()> {
        match event {
            GenericEvent::Started => {
                self.started = true;
                debug!("Monkey ready");
            }
            GenericEvent::ClosingDown => trace!("Monkey closing down"),
            GenericEvent::Finished => {
                self.stopped = true;
                debug!("Monkey reported clean shutdown");
            }
            GenericEvent::Launch { url } => {
                debug!(url = %url, "Monkey launch URL");
                self.launch_url = Some(url);
            }
            GenericEvent::Exit { code } => {
                if !self.stopped {
                    return Err(Error::unexpected_exit(code));
                }
                if code != 0 {
                    warn!(code, "Monkey exited nonzero after reporting finished");
                }
            }
            // Main-loop chatter.
            GenericEvent::Poll | GenericEvent::PresentCookies => {}
            GenericEvent::Unknown { action } => {
                trace!(action = %action, "Ignoring unknown generic notification");
            }
        }
        Ok(())
    }

    fn on_window(&mut self, id: WindowId, action: WindowAction) {
        match action {
            WindowAction::New(params) => {
                debug!(window = %id, core_id = %params.core_id, "Window opened");
                if self.windows.insert(id, Window::new(id, params)).is_some() {
                    warn!(window = %id, "Window id reused by the frontend");
                }
            }
            WindowAction::Destroy => {
                let Some(window) = self.windows.get_mut(&id) else {
                    warn!(window = %id, "Destroy for unknown window");
                    return;
                };
                window.destroy();
                debug!(window = %id, "Window destroyed");
                if self.draw_target == Some(id) {
                    self.draw_target = None;
                }
            }
            WindowAction::RedrawStart => {
                let Some(window) = self.windows.get_mut(&id) else {
                    warn!(window = %id, "Redraw start for unknown window");
                    return;
                };
                window.begin_capture();
                self.draw_target = Some(id);
            }
            WindowAction::RedrawStop => {
                let Some(window) = self.windows.get_mut(&id) else {
                    warn!(window = %id, "Redraw stop for unknown window");
                    return;
                };
                window.end_capture();
                if self.draw_target == Some(id) {
                    self.draw_target = None;
                }
            }
            WindowAction::Update(update) => {
                let Some(window) = self.windows.get_mut(&id) else {
                    warn!(window = %id, "Update for unknown window");
                    return;
                };
                window.apply(update);
            }
            WindowAction::Unknown { action } => {
                trace!(window = %id, action = %action, "Ignoring unknown window notification");
            }
        }
    }

    fn on_login(&mut self, id: LoginId, action: LoginAction) {
        match action {
            LoginAction::Open { url } => {
                debug!(login = %id, url = %url, "Login prompt opened");
                if self
                    .logins
                    .insert(id, CredentialPrompt::new(id, url))
                    .is_some()
                {
                    warn!(login = %id, "Login id reused by the frontend");
                }
            }
            LoginAction::Username { value } => self.update_login(id, |p| p.set_username(value)),
            LoginAction::Password { value } => self.update_login(id, |p| p.set_password(value)),
            LoginAction::Realm { value } => self.update_login(id, |p| p.set_realm(value)),
            LoginAction::Destroy => {
                let Some(prompt) = self.logins.get_mut(&id) else {
                    warn!(login = %id, "Destroy for unknown login prompt");
                    return;
                };
                prompt.destroy();
                debug!(login = %id, "Login prompt destroyed");
            }
            LoginAction::Unknown { action } => {
                trace!(login = %id, action = %action, "Ignoring unknown login notification");
            }
        }
    }

    /// Applies a credential mutation and fires the hook when the prompt
    /// has just become ready.
    fn update_login(&mut self, id: LoginId, apply: impl FnOnce(&mut CredentialPrompt)) {
        let Some(prompt) = self.logins.get_mut(&id) else {
            warn!(login = %id, "Notification for unknown login prompt");
            return;
        };
        let was_ready = prompt.is_ready();
        apply(prompt);
        if prompt.is_alive() && prompt.is_ready() && !was_ready {
            self.answer_login(id);
        }
    }

    /// Consults the credential hook for a ready prompt and acts on its
    /// decision.
    fn answer_login(&mut self, id: LoginId) {
        let Some(prompt) = self.logins.get(&id) else {
            return;
        };
        let snapshot = prompt.clone();
        let decision = (self.credential_hook)(&snapshot);
        match &decision {
            CredentialDecision::Submit { .. } => debug!(login = %id, "Submitting credentials"),
            CredentialDecision::Dismiss => debug!(login = %id, "Dismissing login prompt"),
        }
        if let Err(error) = self.apply_credential_decision(id, decision) {
            warn!(login = %id, %error, "Failed to answer login prompt");
        }
    }

    fn apply_credential_decision(
        &mut self,
        id: LoginId,
        decision: CredentialDecision,
    ) -> Result<()> {
        match decision {
            CredentialDecision::Submit { username, password } => {
                self.send_username(id, username.as_deref())?;
                self.send_password(id, password.as_deref())?;
                self.send(&Command::LoginGo { login: id })
            }
            CredentialDecision::Dismiss => self.send(&Command::LoginDestroy { login: id }),
        }
    }

    fn on_sslcert(&mut self, id: CertId, action: CertAction) {
        match action {
            CertAction::Verify { url } => {
                debug!(cert = %id, url = %url, "Certificate prompt opened");
                if self
                    .certs
                    .insert(id, CertificatePrompt::new(id, url))
                    .is_some()
                {
                    warn!(cert = %id, "Certificate id reused by the frontend");
                }
                self.answer_cert(id);
            }
            CertAction::Destroy => {
                let Some(prompt) = self.certs.get_mut(&id) else {
                    warn!(cert = %id, "Destroy for unknown certificate prompt");
                    return;
                };
                prompt.destroy();
                debug!(cert = %id, "Certificate prompt destroyed");
            }
            CertAction::Unknown { action } => {
                trace!(cert = %id, action = %action, "Ignoring unknown certificate notification");
            }
        }
    }

    /// Consults the certificate hook and acts on its decision.
    fn answer_cert(&mut self, id: CertId) {
        let Some(prompt) = self.certs.get(&id) else {
            return;
        };
        let snapshot = prompt.clone();
        let decision = (self.certificate_hook)(&snapshot);
        debug!(cert = %id, ?decision, "Certificate hook decided");
        let outcome = match decision {
            CertificateDecision::Accept => self.send(&Command::CertGo { cert: id }),
            CertificateDecision::Reject => self.send(&Command::CertDestroy { cert: id }),
        };
        if let Err(error) = outcome {
            warn!(cert = %id, %error, "Failed to answer certificate prompt");
        }
    }

    /// Routes a plot line to the window whose redraw is in flight.
    fn on_plot(&mut self, tokens: Vec<String>) {
        let Some(target) = self.draw_target else {
            trace!("Dropping plot outside a redraw cycle");
            return;
        };
        if let Some(window) = self.windows.get_mut(&target) {
            window.record_plot(tokens);
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("started", &self.started)
            .field("stopped", &self.stopped)
            .field("windows", &self.windows.len())
            .field("logins", &self.logins.len())
            .field("certs", &self.certs.len())
            .field("scheduled", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
