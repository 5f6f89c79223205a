//! Spell crafting
//!
//! A crafted spell's energy cost is the sum of its effect and modifier costs,
//! multiplied by a step function of how many "greater" effects it uses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellEffect {
    pub name: String,
    pub cost: i64,
    #[serde(default)]
    pub greater: bool,
    /// Magic path the effect draws on (e.g. "Body", "Energy")
    #[serde(default)]
    pub path: String,
}

impl SpellEffect {
    pub fn new(name: impl Into<String>, cost: i64, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost,
            greater: false,
            path: path.into(),
        }
    }

    pub fn greater(mut self) -> Self {
        self.greater = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKind {
    Effect,
    #[default]
    Modifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellModifier {
    pub name: String,
    pub cost: i64,
    #[serde(rename = "type", default)]
    pub kind: ModifierKind,
}

impl SpellModifier {
    pub fn new(name: impl Into<String>, cost: i64) -> Self {
        Self {
            name: name.into(),
            cost,
            kind: ModifierKind::Modifier,
        }
    }
}

/// A crafted spell. Built only by [`craft_spell`]; the derived totals can't
/// drift from the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SpellSelection")]
pub struct SpellCraft {
    name: String,
    effects: Vec<SpellEffect>,
    modifiers: Vec<SpellModifier>,
    greater_effects: u32,
    total_energy: i64,
}

/// The user's choices; everything else on a [`SpellCraft`] is derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpellSelection {
    pub name: String,
    pub effects: Vec<SpellEffect>,
    pub modifiers: Vec<SpellModifier>,
}

impl From<SpellSelection> for SpellCraft {
    fn from(selection: SpellSelection) -> Self {
        craft_spell(selection.name, selection.effects, selection.modifiers)
    }
}

impl SpellCraft {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn effects(&self) -> &[SpellEffect] {
        &self.effects
    }

    pub fn modifiers(&self) -> &[SpellModifier] {
        &self.modifiers
    }

    pub fn greater_effects(&self) -> u32 {
        self.greater_effects
    }

    pub fn total_energy(&self) -> i64 {
        self.total_energy
    }

    /// Cost before the greater-effects multiplier.
    pub fn base_cost(&self) -> i64 {
        base_cost(&self.effects, &self.modifiers)
    }
}

/// Energy multiplier for the number of greater effects.
///
/// | n | 0 | 1 | 2 | 3 | 4 | n > 4 |
/// |---|---|---|---|---|---|-------|
/// | × | 1 | 3 | 5 | 7 | 9 | 9 + 2(n − 4) |
pub fn greater_effects_multiplier(greater_effects: u32) -> i64 {
    match greater_effects {
        0 => 1,
        1 => 3,
        2 => 5,
        3 => 7,
        4 => 9,
        n => 9 + 2 * (i64::from(n) - 4),
    }
}

fn base_cost(effects: &[SpellEffect], modifiers: &[SpellModifier]) -> i64 {
    let effects_cost = effects.iter().map(|e| e.cost).fold(0i64, i64::saturating_add);
    let modifiers_cost = modifiers.iter().map(|m| m.cost).fold(0i64, i64::saturating_add);
    effects_cost.saturating_add(modifiers_cost)
}

pub fn craft_spell(
    name: impl Into<String>,
    effects: Vec<SpellEffect>,
    modifiers: Vec<SpellModifier>,
) -> SpellCraft {
    let greater_effects = effects.iter().filter(|e| e.greater).count() as u32;
    let total_energy =
        base_cost(&effects, &modifiers).saturating_mul(greater_effects_multiplier(greater_effects));

    SpellCraft {
        name: name.into(),
        effects,
        modifiers,
        greater_effects,
        total_energy,
    }
}

/// Parse a comma separated list of integers such as `"+2, -1, 3"`.
///
/// Each token is read like a lenient integer parse: optional surrounding
/// whitespace, an optional sign, then leading digits; trailing characters are
/// ignored (`"3rd"` is 3). Tokens with no leading digits are dropped.
/// Magnitudes beyond `i64` saturate at the bound.
pub fn parse_modifier_list(text: &str) -> Vec<i64> {
    text.split(',').filter_map(parse_leading_int).collect()
}

fn parse_leading_int(token: &str) -> Option<i64> {
    let token = token.trim();
    let (negative, rest) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let digits: Vec<i64> = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return None;
    }
    let sign = if negative { -1 } else { 1 };
    Some(digits.into_iter().fold(0i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(sign * digit)
    }))
}
