//! Linux host adapter for promemoria
//!
//! Provides:
//! - One-shot wakes on the tokio runtime (wall-clock checked, inexact windows)
//! - Actionable desktop notifications through `notify-send`
//! - Looped alarm audio in an isolated process group
//! - Process group management for the helper processes

mod adapter;
mod audio;
mod notify;
mod process;
mod timers;

pub use adapter::*;
pub use audio::*;
pub use notify::*;
pub use process::*;
pub use timers::*;
