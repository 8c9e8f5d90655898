//! Protocol types for promemoriad IPC
//!
//! This crate defines the stable API between promemoriad and clients:
//! - Commands (scheduling contract, actions, queries)
//! - Responses
//! - Events (service -> clients)
//! - Shared alert enums and state snapshots
//! - Versioning

mod commands;
mod events;
mod types;

pub use commands::*;
pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
