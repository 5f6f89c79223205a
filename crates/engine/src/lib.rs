//! Realmforge Engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - Realm and spell services over the domain crate
//! - `infrastructure/` - Ports, in-memory adapters, throttle, config
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
