//! Cooperative event loop.
//!
//! Everything the session does happens on one thread, in discrete steps.
//! A step fires due timers, then delivers at most one transport event
//! into the dispatcher; waits are loops over steps with a predicate
//! checked between them. Nothing here is re-entrant and nothing needs a
//! lock.
//!
//! Waits never hang on a dead frontend: once the transport is finished a
//! wait returns the predicate's current value instead of blocking for
//! input that can no longer arrive.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::Instant;

use crate::error::Result;
use crate::schedule::Action;
use crate::transport::TransportEvent;

use super::core::Session;

// ============================================================================
// Session - Event Loop
// ============================================================================

impl Session {
    /// Runs one cooperative step.
    ///
    /// Due timers fire first. Then one transport event is delivered: a
    /// buffered one if any is waiting, otherwise whatever the transport
    /// produces before `until` (bounded further by the earliest timer
    /// deadline). Returns `true` if an event was dispatched.
    pub async fn step(&mut self, until: Option<Instant>) -> Result<bool> {
        self.fire_due_timers();

        // Deliver buffered input before touching the transport again.
        if let Some(event) = self.transport.pop_event() {
            self.deliver(event)?;
            return Ok(true);
        }
        if self.transport.is_finished() {
            return Ok(false);
        }

        let bound = match (until, self.scheduler.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.transport.pump(bound).await?;
        self.fire_due_timers();

        match self.transport.pop_event() {
            Some(event) => {
                self.deliver(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drives the loop until the frontend announces a clean shutdown or
    /// the channel is drained.
    pub async fn run(&mut self) -> Result<()> {
        while !self.stopped && !self.transport.is_finished() {
            self.step(None).await?;
        }
        Ok(())
    }

    /// Drives the loop until `predicate` holds.
    ///
    /// Returns `Ok(true)` when the predicate was satisfied, `Ok(false)`
    /// when the timeout elapsed first or the channel finished with the
    /// predicate still false. A timeout is an outcome, not an error;
    /// transport failures and unexpected exits are errors.
    pub async fn wait_until<P>(&mut self, predicate: P, timeout: Option<Duration>) -> Result<bool>
    where
        P: Fn(&Session) -> bool,
    {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            if predicate(&*self) {
                return Ok(true);
            }
            if self.transport.is_finished() {
                return Ok(false);
            }
            if let Some(d) = deadline
                && Instant::now() >= d
            {
                return Ok(false);
            }
            self.step(deadline).await?;
        }
    }

    /// Sends a quit and drains the channel until the child is gone.
    ///
    /// Returns `true` if the frontend reported a clean shutdown before
    /// exiting; a child that closes the channel without reporting
    /// `FINISHED` surfaces as an unexpected-exit error.
    pub async fn quit_and_wait(&mut self) -> Result<bool> {
        self.quit()?;
        self.wait_until(|s: &Session| s.transport.is_finished(), None)
            .await?;
        Ok(self.stopped)
    }

    fn deliver(&mut self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::Line(line) => self.dispatch(&line),
            TransportEvent::Closed { exit_code } => self.on_transport_closed(exit_code),
        }
    }
}

// ============================================================================
// Session - Timers
// ============================================================================

impl Session {
    /// Schedules `action` to fire at `due`.
    ///
    /// The action runs with mutable access to the session during a later
    /// step; hold on to the handle to [`Session::unschedule`] it.
    pub fn schedule_at(&mut self, due: Instant, action: Action<Session>) {
        self.scheduler.schedule_at(due, action);
    }

    /// Schedules `action` to fire `delay` from now.
    pub fn schedule_in(&mut self, delay: Duration, action: Action<Session>) {
        self.scheduler.schedule_in(delay, action);
    }

    /// Removes every queued entry holding a clone of `action`.
    pub fn unschedule(&mut self, action: &Action<Session>) {
        self.scheduler.unschedule(action);
    }

    /// Fires every due timer, one at a time, re-reading the clock so an
    /// action that schedules further work is observed immediately.
    fn fire_due_timers(&mut self) {
        loop {
            let now = Instant::now();
            let Some(action) = self.scheduler.pop_due(now) else {
                break;
            };
            action(self);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
