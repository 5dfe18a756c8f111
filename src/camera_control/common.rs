//! Common utilities module
//!
//! Error type shared by every stage of the control loop.

pub mod error;

pub use error::{ControlError, Result};
