//! Sway/i3 IPC client for compositor integration
//!
//! This module provides communication with the running sway (or i3) instance
//! via its IPC socket. It lets sway-session:
//! - Query the window tree, workspaces and outputs
//! - Issue imperative commands, globally or scoped to a single container
//!
//! ## Architecture
//!
//! - `Compositor`: the capability the session engine needs from a compositor
//! - `SwayClient`: socket-backed implementation of `Compositor`
//! - `SwayError`: Error types for IPC operations
//!
//! ## Protocol
//!
//! Sway exposes a Unix socket at `$SWAYSOCK` (i3 uses `$I3SOCK`). Every message
//! in either direction is framed as the magic string `i3-ipc`, a 32-bit payload
//! length, a 32-bit message type (both in native byte order) and a JSON payload.

mod client;
mod error;
mod types;

pub use client::{get_socket_path, Compositor, SwayClient};
pub use error::SwayError;
pub use types::{CommandOutcome, MessageType};
