//! Use cases - user story orchestration over the domain and the ports.

pub mod realm;
pub mod spell;

pub use realm::{RealmError, RealmExport, RealmService};
pub use spell::{EstimateRequest, SpellError, SpellService};
