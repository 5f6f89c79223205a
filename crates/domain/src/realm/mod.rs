//! Realm sheets: data model, valuation pipeline, edits and stored schema.

mod edit;
mod model;
pub mod schema;
pub mod valuation;

pub use edit::RealmEdit;
pub use model::{
    default_resource_points, Details, EnhancementItem, FundsAndPeople, Government,
    IndependentIncome, LimitationItem, Military, PointModifier, Realm, ResourcePoint, Resources,
    Surroundings, DEFAULT_RESOURCE_POINTS,
};
pub use schema::{load_realm, load_realm_str, migrate, RealmDocument, CURRENT_SCHEMA_VERSION};
pub use valuation::{
    compute_realm_derived_fields, EarningsModifiers, RealmComputedFields, RealmInputs,
};
