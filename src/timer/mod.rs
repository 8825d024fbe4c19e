//! Timer coordination module
//!
//! This module contains the countdown timer, the square wave generator and
//! the controller that keeps the two paired.

pub mod admission;
pub mod controller;
pub mod countdown;
pub mod generator;

// Re-export main types
pub use admission::{DurationRequest, TimeField};
pub use controller::TimerController;
pub use countdown::{CountdownTimer, OnComplete, TimerPhase};
pub use generator::SignalGenerator;
