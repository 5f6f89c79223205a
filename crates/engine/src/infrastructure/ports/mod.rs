//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Document storage (in-memory today, a database tomorrow)
//! - Clock (for testing)

mod error;
mod repos;
mod testing;
pub mod types;

pub use error::RepoError;
pub use repos::{RealmRepo, SpellCraftRepo};
pub use testing::ClockPort;
pub use types::{RealmRecord, SpellCraftRecord};

#[cfg(test)]
pub use repos::{MockRealmRepo, MockSpellCraftRepo};

#[cfg(test)]
pub use testing::MockClockPort;
