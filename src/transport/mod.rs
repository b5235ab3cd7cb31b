//! Stdio transport layer.
//!
//! This module handles communication between the driver (Rust) and the
//! monkey frontend (child process) over the child's stdin/stdout pair.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Session (Rust) │                              │  Monkey         │
//! │                 │    newline-delimited text    │  (child proc)   │
//! │  Transport      │◄────────────────────────────►│                 │
//! │  → LineBuffer   │        stdin / stdout        │  frontend       │
//! │                 │                              │  main loop      │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Child process ownership, bounded IO pumping, close handling |
//! | `framing` | Newline reassembly of arbitrary read chunks |

// ============================================================================
// Submodules
// ============================================================================

/// Child process channel and event queue.
pub mod channel;

/// Newline framing of the inbound byte stream.
pub mod framing;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{Direction, Transport, TransportEvent, TranscriptEntry};
pub use framing::LineBuffer;
