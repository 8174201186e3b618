//! Cadence Demo
//!
//! Runs the playback control core against a simulated player and focus
//! service, for trying configurations without a real platform.

pub mod config;
pub mod error;
pub mod session;
pub mod sim;

pub use config::{DemoConfig, SessionSettings};
pub use error::{DemoError, Result};
