//! Window operations.
//!
//! Caller-facing operations on frontend windows: opening, navigation,
//! script execution, redraw capture and console-log queries. Each
//! operation validates the target against the registry first - a window
//! id that was never announced is [`Error::WindowNotFound`], one whose
//! window the frontend has destroyed is [`Error::WindowDestroyed`].
//! Destroyed windows stay readable through [`Session::window`]; they
//! just refuse further commands.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::browser::{LogFilter, PlotCommand, Window};
use crate::error::{Error, Result};
use crate::identifiers::WindowId;
use crate::protocol::{Command, RedrawArea};

use super::core::Session;

// ============================================================================
// Session - Window Registry
// ============================================================================

impl Session {
    /// Looks up a window mirror, destroyed ones included.
    pub fn window(&self, window: WindowId) -> Result<&Window> {
        self.windows
            .get(&window)
            .ok_or_else(|| Error::window_not_found(window))
    }

    /// Iterates every known window mirror, in no particular order.
    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    /// Looks up a window and insists it is still alive.
    fn live_window(&self, window: WindowId) -> Result<&Window> {
        let entry = self.window(window)?;
        if !entry.is_alive() {
            return Err(Error::window_destroyed(window));
        }
        Ok(entry)
    }
}

// ============================================================================
// Session - Window Operations
// ============================================================================

impl Session {
    /// Opens a window, optionally at `url`, and waits for the frontend to
    /// announce it.
    ///
    /// Returns the id of the newly announced window.
    pub async fn new_window(&mut self, url: Option<&str>) -> Result<WindowId> {
        let known: FxHashSet<WindowId> = self.windows.keys().copied().collect();
        self.send(&Command::WindowNew {
            url: url.map(str::to_owned),
        })?;

        let seen = known.clone();
        let announced = self
            .wait_until(
                move |s: &Session| s.windows.keys().any(|id| !seen.contains(id)),
                None,
            )
            .await?;
        if !announced {
            return Err(Error::ChannelClosed);
        }

        let id = self
            .windows
            .keys()
            .copied()
            .find(|id| !known.contains(id))
            .ok_or(Error::ChannelClosed)?;
        debug!(window = %id, "New window ready");
        Ok(id)
    }

    /// Starts a navigation without waiting for anything.
    pub fn go(&mut self, window: WindowId, url: &str, referer: Option<&str>) -> Result<()> {
        self.live_window(window)?;
        self.send(&Command::WindowGo {
            window,
            url: url.to_owned(),
            referer: referer.map(str::to_owned),
        })
    }

    /// Starts a navigation and waits until the frontend begins loading.
    pub async fn navigate(
        &mut self,
        window: WindowId,
        url: &str,
        referer: Option<&str>,
    ) -> Result<()> {
        self.go(window, url, referer)?;
        self.wait_loading_started(window).await?;
        Ok(())
    }

    /// Navigates, when given a URL, and waits until the page has loaded.
    ///
    /// With no URL it just waits out a load already under way, such as
    /// one started through [`Session::go`] or by the page itself.
    pub async fn load_page(&mut self, window: WindowId, url: Option<&str>) -> Result<()> {
        if let Some(url) = url {
            self.go(window, url, None)?;
        }
        self.wait_loaded(window).await?;
        Ok(())
    }

    /// Waits until the window's throbber is spinning.
    ///
    /// Also returns once the window dies or the channel finishes, so a
    /// navigation that never starts cannot hang the caller.
    pub async fn wait_loading_started(&mut self, window: WindowId) -> Result<bool> {
        self.window(window)?;
        self.wait_until(
            move |s: &Session| {
                s.windows
                    .get(&window)
                    .is_none_or(|w| w.is_throbbing() || !w.is_alive())
            },
            None,
        )
        .await
    }

    /// Waits until a load cycle completes: throbber on, then off again.
    ///
    /// Calling this straight after [`Session::go`] does not return
    /// during the idle gap before the frontend starts loading.
    pub async fn wait_loaded(&mut self, window: WindowId) -> Result<bool> {
        self.wait_loading_started(window).await?;
        self.wait_until(
            move |s: &Session| {
                s.windows
                    .get(&window)
                    .is_none_or(|w| !w.is_throbbing() || !w.is_alive())
            },
            None,
        )
        .await
    }

    /// Aborts the window's in-progress load.
    pub fn stop_loading(&mut self, window: WindowId) -> Result<()> {
        self.live_window(window)?;
        self.send(&Command::WindowStop { window })
    }

    /// Reloads the window's current page.
    pub fn reload(&mut self, window: WindowId) -> Result<()> {
        self.live_window(window)?;
        self.send(&Command::WindowReload { window })
    }

    /// Runs JavaScript source in the window's page context.
    ///
    /// Fire-and-forget: results come back, if at all, through the
    /// window's console log.
    pub fn execute_script(&mut self, window: WindowId, source: &str) -> Result<()> {
        self.live_window(window)?;
        self.send(&Command::WindowExec {
            window,
            source: source.to_owned(),
        })
    }

    /// Asks the frontend to close the window and waits until it is gone.
    pub async fn close_window(&mut self, window: WindowId) -> Result<()> {
        self.live_window(window)?;
        self.send(&Command::WindowDestroy { window })?;
        self.wait_window_dead(window).await?;
        Ok(())
    }

    /// Waits until the frontend has destroyed the window.
    pub async fn wait_window_dead(&mut self, window: WindowId) -> Result<bool> {
        self.window(window)?;
        self.wait_until(
            move |s: &Session| s.windows.get(&window).is_none_or(|w| !w.is_alive()),
            None,
        )
        .await
    }

    /// Forces a redraw and captures the resulting plot stream.
    ///
    /// Drives the loop through the frontend's capture-start and
    /// capture-stop markers, then returns the plots recorded between
    /// them. `area` restricts the redraw to a sub-rectangle.
    pub async fn redraw(
        &mut self,
        window: WindowId,
        area: Option<RedrawArea>,
    ) -> Result<Vec<PlotCommand>> {
        self.live_window(window)?;
        self.send(&Command::WindowRedraw { window, area })?;

        self.wait_until(
            move |s: &Session| {
                s.windows
                    .get(&window)
                    .is_none_or(|w| w.is_capturing() || !w.is_alive())
            },
            None,
        )
        .await?;
        self.wait_until(
            move |s: &Session| {
                s.windows
                    .get(&window)
                    .is_none_or(|w| !w.is_capturing() || !w.is_alive())
            },
            None,
        )
        .await?;

        Ok(self.window(window)?.plotted().to_vec())
    }
}

// ============================================================================
// Session - Console Log
// ============================================================================

impl Session {
    /// Returns `true` if the window's log has an entry matching `filter`.
    ///
    /// A filter with no criteria is a caller error, not an empty match.
    pub fn log_contains(&self, window: WindowId, filter: &LogFilter) -> Result<bool> {
        if filter.is_empty() {
            return Err(Error::EmptyLogFilter);
        }
        Ok(self.window(window)?.log_matches(filter))
    }

    /// Waits until the window's log has an entry matching `filter`.
    ///
    /// Returns the match state at return time, which can be false when
    /// the timeout elapses or the window dies first.
    pub async fn wait_for_log(
        &mut self,
        window: WindowId,
        filter: &LogFilter,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        if filter.is_empty() {
            return Err(Error::EmptyLogFilter);
        }
        self.window(window)?;

        let wanted = filter.clone();
        self.wait_until(
            move |s: &Session| {
                s.windows
                    .get(&window)
                    .is_none_or(|w| !w.is_alive() || w.log_matches(&wanted))
            },
            timeout,
        )
        .await?;
        Ok(self.window(window)?.log_matches(filter))
    }

    /// Discards the window's accumulated console-log entries.
    pub fn clear_log(&mut self, window: WindowId) -> Result<()> {
        self.live_window(window)?;
        if let Some(entry) = self.windows.get_mut(&window) {
            entry.clear_log();
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
