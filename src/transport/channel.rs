//! Byte channel to the monkey process.
//!
//! This module owns the child process and its stdio pipes. It turns the
//! raw byte stream into a queue of [`TransportEvent`]s for the session
//! event loop and records every line of traffic for post-mortem debugging.
//!
//! # Channel Lifecycle
//!
//! 1. [`Transport::spawn`] - Launch the frontend with piped stdin/stdout
//! 2. [`Transport::send_line`] - Queue an outbound command line
//! 3. [`Transport::pump`] - Flush queued writes, then wait (bounded) for
//!    input and decode it into complete lines
//! 4. End-of-stream - Reap the child and synthesize a
//!    [`TransportEvent::Closed`] ahead of any undispatched lines
//! 5. Drop - Kill the child if it was never reaped

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::io::{Error as IoError, ErrorKind};
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::transport::framing::LineBuffer;

// ============================================================================
// Constants
// ============================================================================

/// Read chunk size for the stdout pipe.
const READ_CHUNK: usize = 8192;

// ============================================================================
// TransportEvent
// ============================================================================

/// One unit of input for the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete protocol line from the frontend, terminator stripped.
    Line(String),

    /// The channel reached end-of-stream and the child was reaped.
    ///
    /// This is a distinct event, not a fabricated protocol line, so the
    /// dispatcher can tell a real `GENERIC EXIT` announcement from the
    /// process disappearing. It is queued ahead of lines that were
    /// decoded but not yet dispatched when the stream closed.
    Closed {
        /// Process exit code; negative when the child died to a signal.
        exit_code: i32,
    },
}

// ============================================================================
// Transcript
// ============================================================================

/// Direction of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the driver to the frontend.
    Sent,
    /// Received from the frontend.
    Received,
}

/// One line of recorded protocol traffic.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    /// Who produced the line.
    pub direction: Direction,
    /// The line text, terminator stripped.
    pub text: String,
}

impl TranscriptEntry {
    #[inline]
    fn sent(text: &str) -> Self {
        Self {
            direction: Direction::Sent,
            text: text.to_owned(),
        }
    }

    #[inline]
    fn received(text: &str) -> Self {
        Self {
            direction: Direction::Received,
            text: text.to_owned(),
        }
    }
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Sent => write!(f, ">> {}", self.text),
            Direction::Received => write!(f, "<< {}", self.text),
        }
    }
}

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guard that ensures the child process is killed when dropped.
struct ProcessGuard {
    /// The child process handle, until reaped.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
    /// Exit code once the child has been reaped.
    exit_code: Option<i32>,
}

impl ProcessGuard {
    /// Creates a new process guard.
    fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
            exit_code: None,
        }
    }

    /// Waits for the child to exit and returns its exit code.
    ///
    /// Reaping twice returns the recorded code.
    async fn reap(&mut self) -> i32 {
        let Some(mut child) = self.child.take() else {
            return self.exit_code.unwrap_or(-1);
        };
        let code = match child.wait().await {
            Ok(status) => exit_status_code(status),
            Err(e) => {
                warn!(pid = self.pid, error = %e, "Failed to reap monkey process");
                -1
            }
        };
        info!(pid = self.pid, code, "Monkey process exited");
        self.exit_code = Some(code);
        code
    }

    /// Returns the process ID.
    #[inline]
    fn pid(&self) -> u32 {
        self.pid
    }
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

/// Maps an exit status to the protocol's integer convention.
fn exit_status_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}

// ============================================================================
// Transport
// ============================================================================

/// Duplex line channel to the monkey process.
///
/// Writes are queued by [`Transport::send_line`] and flushed at the start
/// of every [`Transport::pump`], so a command issued just before a wait
/// always reaches the child before the wait blocks on its reply.
pub struct Transport {
    /// Kill-on-drop handle to the child.
    process: ProcessGuard,
    /// Child stdin, used for outbound command lines.
    stdin: ChildStdin,
    /// Child stdout, the inbound notification stream.
    stdout: ChildStdout,
    /// Reassembles lines from read chunks.
    inbound: LineBuffer,
    /// Decoded events not yet taken by the dispatcher.
    pending: VecDeque<TransportEvent>,
    /// Bytes queued for the next flush.
    outbound: Vec<u8>,
    /// Every line sent or received, in order.
    transcript: Vec<TranscriptEntry>,
    /// Set once end-of-stream has been processed.
    closed: bool,
}

impl Transport {
    /// Spawns the frontend process and captures its stdio.
    ///
    /// The caller supplies a fully assembled command (wrapper, binary and
    /// arguments); this function only wires the pipes. Stderr is
    /// inherited so frontend diagnostics reach the test output.
    pub(crate) fn spawn(mut command: Command) -> Result<Self> {
        command.stdin(Stdio::piped()).stdout(Stdio::piped());
        let mut child = command.spawn().map_err(Error::launch)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::launch(IoError::other("child stdin was not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::launch(IoError::other("child stdout was not captured")))?;

        let process = ProcessGuard::new(child);
        info!(pid = process.pid(), "Monkey process spawned");

        Ok(Self {
            process,
            stdin,
            stdout,
            inbound: LineBuffer::new(),
            pending: VecDeque::new(),
            outbound: Vec::new(),
            transcript: Vec::new(),
            closed: false,
        })
    }

    /// Queues one command line for sending.
    ///
    /// The line must not contain a newline; the terminator is appended
    /// here. Fails once the channel has closed.
    pub(crate) fn send_line(&mut self, line: &str) -> Result<()> {
        if self.closed {
            warn!(line = %line, "Dropping send on closed channel");
            return Err(Error::ChannelClosed);
        }
        trace!(line = %line, "send");
        self.outbound.extend_from_slice(line.as_bytes());
        self.outbound.push(b'\n');
        self.transcript.push(TranscriptEntry::sent(line));
        Ok(())
    }

    /// Runs one bounded IO step: flush queued writes, then wait for input
    /// until `deadline` (or indefinitely when `None`).
    ///
    /// Reads are decoded into the pending event queue; returning with
    /// nothing new queued means the deadline elapsed first. Once the
    /// channel has closed this is a no-op.
    pub(crate) async fn pump(&mut self, deadline: Option<Instant>) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush_outbound().await?;

        let mut chunk = [0u8; READ_CHUNK];
        let read = match deadline {
            Some(d) => {
                tokio::select! {
                    res = self.stdout.read(&mut chunk) => Some(res),
                    _ = tokio::time::sleep_until(d) => None,
                }
            }
            None => Some(self.stdout.read(&mut chunk).await),
        };

        match read {
            None => Ok(()),
            Some(Ok(0)) => self.handle_eof().await,
            Some(Ok(n)) => {
                self.ingest(&chunk[..n]);
                Ok(())
            }
            Some(Err(e)) => Err(e.into()),
        }
    }

    /// Takes the next decoded event, if any.
    #[inline]
    pub(crate) fn pop_event(&mut self) -> Option<TransportEvent> {
        self.pending.pop_front()
    }

    /// Returns `true` if decoded events are waiting.
    #[inline]
    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Returns `true` once end-of-stream has been processed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns `true` when the channel is closed and every decoded event
    /// has been taken.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.closed && self.pending.is_empty()
    }

    /// Returns the child's exit code, once reaped.
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        self.process.exit_code
    }

    /// Returns the recorded protocol traffic, oldest first.
    #[inline]
    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Writes out everything queued by [`Transport::send_line`].
    async fn flush_outbound(&mut self) -> Result<()> {
        if self.outbound.is_empty() {
            return Ok(());
        }
        let data = std::mem::take(&mut self.outbound);
        let wrote = async {
            self.stdin.write_all(&data).await?;
            self.stdin.flush().await
        };
        match wrote.await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                // The child went away mid-write; the read side will see
                // end-of-stream on the next pump.
                warn!(bytes = data.len(), "Monkey stdin closed; dropping queued output");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Decodes a read chunk into pending line events.
    fn ingest(&mut self, chunk: &[u8]) {
        self.inbound.push(chunk);
        while let Some(line) = self.inbound.next_line() {
            trace!(line = %line, "recv");
            self.transcript.push(TranscriptEntry::received(&line));
            self.pending.push_back(TransportEvent::Line(line));
        }
    }

    /// Reaps the child and queues the close event ahead of pending lines.
    async fn handle_eof(&mut self) -> Result<()> {
        let tail = self.inbound.pending_bytes();
        if tail > 0 {
            trace!(bytes = tail, "Discarding unterminated tail at close");
        }
        let exit_code = self.process.reap().await;
        self.closed = true;
        debug!(exit_code, "Monkey channel closed");
        self.pending.push_front(TransportEvent::Closed { exit_code });
        Ok(())
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("pid", &self.process.pid())
            .field("closed", &self.closed)
            .field("pending", &self.pending.len())
            .field("transcript_len", &self.transcript.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
