//! Quick ritual estimate, a one-roll approximation for the table.

use serde::{Deserialize, Serialize};

use super::dice::DiceRoller;

pub const MIN_SUCCESS_CHANCE: i64 = 5;
pub const MAX_SUCCESS_CHANCE: i64 = 95;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RitualEstimate {
    pub ritual: String,
    pub path: String,
    pub base_power: i64,
    pub total_modifiers: i64,
    pub final_result: i64,
    /// Percentage in `5..=95`
    pub success_chance: i64,
}

/// `power * 2` plus a `0..=9` swing, then the flat modifiers.
pub fn ritual_estimate<D>(
    ritual: impl Into<String>,
    path: impl Into<String>,
    power: i64,
    modifiers: &[i64],
    dice: &mut D,
) -> RitualEstimate
where
    D: DiceRoller + ?Sized,
{
    let total_modifiers = modifiers.iter().copied().fold(0i64, i64::saturating_add);
    let swing = i64::from(dice.roll_die(10)) - 1;
    let base = power.saturating_mul(2).saturating_add(swing);

    let success_chance = 50_i64
        .saturating_add(power.saturating_mul(2))
        .saturating_add(total_modifiers)
        .clamp(MIN_SUCCESS_CHANCE, MAX_SUCCESS_CHANCE);

    RitualEstimate {
        ritual: ritual.into(),
        path: path.into(),
        base_power: power,
        total_modifiers,
        final_result: base.saturating_add(total_modifiers),
        success_chance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::magic::dice::{RandomDice, ScriptedDice};
    use crate::magic::parse_modifier_list;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn estimate_uses_power_swing_and_modifiers() {
        let mut dice = ScriptedDice::new(vec![4]);
        let mods = parse_modifier_list("2, -1, x, 3");
        let estimate = ritual_estimate("Ward", "Protection", 5, &mods, &mut dice);

        assert_eq!(estimate.total_modifiers, 4);
        // 5*2 + (4-1) + 4
        assert_eq!(estimate.final_result, 17);
        assert_eq!(estimate.success_chance, 64);
        assert_eq!(estimate.base_power, 5);
        assert_eq!(estimate.path, "Protection");
    }

    #[test]
    fn success_chance_is_clamped() {
        let mut dice = ScriptedDice::new(vec![1]);
        let high = ritual_estimate("Big", "Energy", 40, &[], &mut dice);
        assert_eq!(high.success_chance, 95);

        let low = ritual_estimate("Hopeless", "Energy", 0, &[-80], &mut dice);
        assert_eq!(low.success_chance, 5);
        assert_eq!(low.final_result, -80);
    }

    #[test]
    fn swing_stays_within_zero_to_nine() {
        let mut dice = RandomDice::new(StdRng::seed_from_u64(99));
        for _ in 0..1_000 {
            let estimate = ritual_estimate("Scry", "Mind", 3, &[], &mut dice);
            assert!((6..=15).contains(&estimate.final_result));
        }
    }

    #[test]
    fn serializes_in_camel_case() {
        let mut dice = ScriptedDice::new(vec![1]);
        let estimate = ritual_estimate("Ward", "Protection", 1, &[1], &mut dice);
        let json = serde_json::to_value(&estimate).unwrap();
        assert_eq!(json["successChance"], 53);
        assert_eq!(json["finalResult"], 3);
    }

    #[test]
    fn large_modifiers_saturate() {
        let mut dice = ScriptedDice::new(vec![10]);
        let mods = parse_modifier_list("99999999999, 9223372036854775807");
        let estimate = ritual_estimate("Cataclysm", "Energy", 2, &mods, &mut dice);
        assert_eq!(estimate.total_modifiers, i64::MAX);
        assert_eq!(estimate.final_result, i64::MAX);
        assert_eq!(estimate.success_chance, 95);
    }
}
