//! Realmforge domain: rule computations for realm sheets and Ritual Path
//! magic.
//!
//! Everything here is synchronous and free of I/O. Randomness enters only
//! through [`magic::DiceRoller`].

pub mod error;
pub mod ids;
pub mod magic;
pub mod realm;
pub mod rounding;
pub mod tables;

pub use error::DomainError;
pub use ids::{OwnerId, RealmId, SpellCraftId};

pub use magic::{
    cast_spell, craft_spell, greater_effects_multiplier, parse_modifier_list, ritual_estimate,
    CastRequest, CastingLimits, CastingResult, CastingRoll, CastingTermination, DiceRoller,
    RandomDice, RitualEstimate, ScriptedDice, SpellCraft, SpellEffect, SpellModifier,
};
pub use realm::{
    compute_realm_derived_fields, Realm, RealmComputedFields, RealmEdit, RealmInputs,
};
