//! Casting simulation
//!
//! A casting attempt rolls 3d6 against the caster's skill repeatedly,
//! gathering energy until the spell's requirement is met or a critical
//! failure ends it.
//!
//! Per roll:
//!
//! 1. `effective = min(skill - penalty, cap)`; the penalty grows by one after
//!    every third roll.
//! 2. Critical success and failure are judged against the *unpenalized*
//!    `min(skill, cap)`. Ordinary success uses `effective`.
//! 3. Critical failure ends the attempt with no energy from that roll.
//!    A success gathers `max(1, effective - roll + 1)`. A miss gathers 1
//!    and leaves a quirk.
//!
//! The loop is additionally bounded by [`CastingLimits::max_attempts`].

use serde::{Deserialize, Serialize};

use super::dice::DiceRoller;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Rolls per point of cumulative penalty.
pub const ROLLS_PER_PENALTY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastRequest {
    pub spell_name: String,
    pub required_energy: i64,
    /// Highest effective skill usable for this casting
    pub cap: i32,
    pub skill: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastingLimits {
    pub max_attempts: u32,
}

impl Default for CastingLimits {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastingRoll {
    pub roll: i32,
    pub energy: i64,
    pub success: bool,
    pub critical: bool,
    pub quirk: bool,
    pub critical_failure: bool,
}

/// Why the rolling stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastingTermination {
    EnergyGathered,
    CriticalFailure,
    AttemptLimitReached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastingResult {
    pub spell_name: String,
    pub required_energy: i64,
    pub cap: i32,
    pub skill: i32,
    pub rolls: Vec<CastingRoll>,
    pub total_energy: i64,
    pub success: bool,
    pub quirks: Vec<String>,
    pub critical_failure: bool,
    pub termination: CastingTermination,
}

pub fn is_critical_success(roll: i32, skill: i32, cap: i32) -> bool {
    roll <= 4 || roll <= skill.min(cap).saturating_sub(10)
}

pub fn is_critical_failure(roll: i32, skill: i32, cap: i32) -> bool {
    let base = skill.min(cap);
    if base < 16 {
        roll >= 17
    } else {
        roll >= base.saturating_add(10) || roll >= 18
    }
}

/// Simulate one casting attempt.
///
/// A non-positive `required_energy` is already satisfied: the result has no
/// rolls and counts as a success.
pub fn cast_spell<D>(request: &CastRequest, limits: &CastingLimits, dice: &mut D) -> CastingResult
where
    D: DiceRoller + ?Sized,
{
    let CastRequest {
        spell_name,
        required_energy,
        cap,
        skill,
    } = request;
    let (required_energy, cap, skill) = (*required_energy, *cap, *skill);

    let mut rolls: Vec<CastingRoll> = Vec::new();
    let mut quirks = Vec::new();
    let mut total_energy: i64 = 0;
    let mut attempt_penalty: i32 = 0;
    let mut any_success = false;
    let mut critical_failure = false;

    let termination = loop {
        if total_energy >= required_energy {
            break CastingTermination::EnergyGathered;
        }
        if rolls.len() >= limits.max_attempts as usize {
            break CastingTermination::AttemptLimitReached;
        }

        let roll = dice.roll_3d6();
        let effective_skill = skill.saturating_sub(attempt_penalty).min(cap);
        let crit_success = is_critical_success(roll, skill, cap);
        let crit_failure = is_critical_failure(roll, skill, cap);
        let roll_success = roll <= effective_skill;
        let attempt = rolls.len() + 1;

        let (energy, quirk) = if crit_failure {
            (0, false)
        } else if crit_success || roll_success {
            any_success = true;
            let margin = i64::from(effective_skill) - i64::from(roll) + 1;
            (margin.max(1), false)
        } else {
            quirks.push(format!("Quirk from roll {attempt} (rolled {roll} against {effective_skill})"));
            (1, true)
        };

        rolls.push(CastingRoll {
            roll,
            energy,
            success: roll_success || crit_success,
            critical: crit_success,
            quirk,
            critical_failure: crit_failure,
        });

        if crit_failure {
            critical_failure = true;
            break CastingTermination::CriticalFailure;
        }

        total_energy += energy;
        if rolls.len() % ROLLS_PER_PENALTY == 0 {
            attempt_penalty = attempt_penalty.saturating_add(1);
        }
    };

    let success = match termination {
        CastingTermination::EnergyGathered => rolls.is_empty() || any_success,
        CastingTermination::CriticalFailure | CastingTermination::AttemptLimitReached => false,
    };

    CastingResult {
        spell_name: spell_name.clone(),
        required_energy,
        cap,
        skill,
        rolls,
        total_energy,
        success,
        quirks,
        critical_failure,
        termination,
    }
}
