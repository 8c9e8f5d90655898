//! Host adapter trait interfaces for promemoria
//!
//! This crate defines the capability-based interface between the alert core
//! and platform-specific implementations: wake timers, notification
//! surfaces, and the audio/vibration output channel. It contains no
//! platform code itself.

mod capabilities;
mod mock;
mod surface;
mod traits;

pub use capabilities::*;
pub use mock::*;
pub use surface::*;
pub use traits::*;
