//! Alert engine for promemoriad
//!
//! This crate is the heart of promemoriad, containing:
//! - Reminder id to handle mapping without collisions
//! - Wake scheduling with exact/inexact fallback and stale-wake detection
//! - Dispatch of fired wakes, re-validated against the reminder store
//! - Notification surfaces and their Snooze/Complete/Stop/Start actions
//! - The alarm output state machine (Idle -> Starting -> Looping -> Stopping -> Idle)

mod alarm;
mod dispatcher;
mod engine;
mod events;
mod mapper;
mod presenter;
mod reader;
mod scheduler;
mod snooze;

#[cfg(test)]
mod testing;

pub use alarm::*;
pub use engine::*;
pub use events::*;
pub use mapper::*;
pub use presenter::*;
pub use reader::*;
pub use scheduler::*;
pub use snooze::*;
