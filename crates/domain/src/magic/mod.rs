//! Ritual Path magic: crafting, casting, and quick estimates.

pub mod casting;
pub mod craft;
pub mod dice;
pub mod estimate;

pub use casting::{
    cast_spell, is_critical_failure, is_critical_success, CastRequest, CastingLimits,
    CastingResult, CastingRoll, CastingTermination, DEFAULT_MAX_ATTEMPTS,
};
pub use craft::{
    craft_spell, greater_effects_multiplier, parse_modifier_list, ModifierKind, SpellCraft,
    SpellEffect, SpellModifier, SpellSelection,
};
pub use dice::{DiceRoller, RandomDice, ScriptedDice};
pub use estimate::{ritual_estimate, RitualEstimate};
