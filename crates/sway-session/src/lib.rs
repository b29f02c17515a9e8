//! Save and restore sway workspace layouts
//!
//! A profile records which windows live on which workspace, the split
//! orientation of each workspace, and which physical output each workspace was
//! on. Loading a profile moves live windows and workspaces back into place
//! after outputs were reconnected or the compositor restarted.

pub mod engine;
pub mod error;
pub mod matcher;
pub mod notify;
pub mod store;
pub mod sway_ipc;
pub mod tree;

pub use engine::{LoadReport, Session};
pub use error::SessionError;
