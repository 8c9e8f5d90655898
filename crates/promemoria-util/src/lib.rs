//! Shared utilities for promemoria
//!
//! This crate provides:
//! - ID types (ReminderId, AlertHandle, SessionId, ClientId)
//! - Deterministic handle derivation
//! - Time utilities (wall clock with mock support, monotonic time, epoch-ms)
//! - The alert error taxonomy
//! - Default paths for socket, data, store, and config

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
