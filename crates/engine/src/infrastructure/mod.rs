//! Infrastructure - ports and their adapters.

pub mod clock;
pub mod config;
pub mod memory;
pub mod ports;
pub mod throttle;
