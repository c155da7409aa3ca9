//! Directory watching
//!
//! Converts RAW files as they appear in a directory, for unattended use at
//! the telescope.

mod engine;
mod error;
mod event;

pub use engine::{Dispatch, JOIN_TIMEOUT, POLL_INTERVAL, WatchEngine, WatchHandle};
pub use error::{Result, WatchError};
pub use event::WatchEvent;
