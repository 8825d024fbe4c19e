//! Pulse Timer - A web controlled countdown timer with a square wave output
//!
//! This library coordinates a single countdown timer with a background
//! signal generator that toggles an output line while the countdown runs,
//! and exposes start, stop and status over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod output;
pub mod state;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, TimerStatus};
pub use timer::TimerController;
pub use utils::signals::shutdown_signal;
