//! Realm lookup tables
//!
//! Two kinds of table live here:
//!
//! - **Threshold tables** map a continuous rating onto a tier. Each tier is
//!   selected by the highest threshold that is `<=` the rating ("floor"
//!   selection); a rating equal to a threshold selects that tier. Ratings
//!   below the lowest threshold fall back to the lowest tier.
//! - **Indexed tables** map a small integer rating (tech level, control
//!   rating) directly onto a value. Out-of-range ratings are clamped to the
//!   nearest bound, never rejected.

use crate::rounding::round_half_up;

/// One tier of a threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier<T> {
    pub min: f64,
    pub output: T,
}

/// An immutable threshold table sorted ascending by `min`.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTable<T: 'static> {
    tiers: &'static [Tier<T>],
}

impl<T: 'static> ThresholdTable<T> {
    /// Wrap a static slice of tiers.
    ///
    /// The slice must be non-empty, strictly ascending by `min`, and start at
    /// the lowest meaningful rating. The tables in this module are checked by
    /// tests.
    pub const fn new(tiers: &'static [Tier<T>]) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &'static [Tier<T>] {
        self.tiers
    }

    /// Floor lookup via binary search.
    ///
    /// Returns the tier with the greatest `min <= value`, or the lowest tier if
    /// `value` is below every threshold (including NaN).
    pub fn lookup(&self, value: f64) -> &'static T {
        let tiers = self.tiers;
        let idx = tiers.partition_point(|tier| tier.min <= value);
        let tier = if idx == 0 { &tiers[0] } else { &tiers[idx - 1] };
        &tier.output
    }
}

/// Habitability tier label plus the optional modifier suffix shown next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitabilityTier {
    pub label: &'static str,
    pub modifier: &'static str,
}

impl HabitabilityTier {
    /// `"Poor -1"`, or just `"Neutral"` when the modifier is empty.
    pub fn display(&self) -> String {
        if self.modifier.is_empty() {
            self.label.to_string()
        } else {
            format!("{} {}", self.label, self.modifier)
        }
    }
}

const fn hab(min: f64, label: &'static str, modifier: &'static str) -> Tier<HabitabilityTier> {
    Tier {
        min,
        output: HabitabilityTier { label, modifier },
    }
}

const fn label(min: f64, output: &'static str) -> Tier<&'static str> {
    Tier { min, output }
}

const HABITABILITY_TIERS: [Tier<HabitabilityTier>; 8] = [
    hab(0.0, "Disastrous", "-3*"),
    hab(1.0, "Very Bad", "-2*"),
    hab(4.0, "Bad", "-1*"),
    hab(7.0, "Poor", "-1"),
    hab(10.0, "Neutral", ""),
    hab(13.0, "Good", "+1"),
    hab(16.0, "Very Good", "+2*"),
    hab(19.0, "Excellent", "+3*"),
];

pub const HABITABILITY: ThresholdTable<HabitabilityTier> = ThresholdTable::new(&HABITABILITY_TIERS);

const CITIZEN_LOYALTY_TIERS: [Tier<&'static str>; 8] = [
    label(0.0, "Disastrous"),
    label(1.0, "Very Bad"),
    label(4.0, "Bad"),
    label(7.0, "Poor"),
    label(10.0, "Neutral"),
    label(13.0, "Good"),
    label(16.0, "Very Good"),
    label(19.0, "Excellent"),
];

pub const CITIZEN_LOYALTY: ThresholdTable<&'static str> = ThresholdTable::new(&CITIZEN_LOYALTY_TIERS);

/// Typical monthly pay, indexed by tech level 0..=12.
pub const AVERAGE_INCOME_BY_TL: [f64; 13] = [
    625.0, 650.0, 675.0, 700.0, 800.0, 1100.0, 1600.0, 2100.0, 2600.0, 3600.0, 5600.0, 8100.0,
    10600.0,
];

/// Share of the economy spent on the military, indexed by control rating 0..=7.
pub const MILITARY_BUDGET_BY_CR: [f64; 8] = [0.0, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5];

/// Share of the economy collected as revenue, indexed by (taxation rating + 1) 0..=7.
pub const REVENUE_FACTOR_BY_CR: [f64; 8] = [0.0, 0.005, 0.02, 0.05, 0.1, 0.2, 0.3, 0.5];

pub const MAX_TECH_LEVEL: i64 = 12;
pub const MAX_CONTROL_RATING: i64 = 7;

fn clamped_index(rating: i64, max: i64) -> usize {
    rating.clamp(0, max) as usize
}

pub fn habitability_tier(value: f64) -> HabitabilityTier {
    *HABITABILITY.lookup(value)
}

/// Habitability label with its modifier suffix, e.g. `"Very Good +2*"`.
pub fn habitability_label(value: f64) -> String {
    habitability_tier(value).display()
}

pub fn citizen_loyalty_label(value: f64) -> &'static str {
    CITIZEN_LOYALTY.lookup(value)
}

/// Average income for a tech level.
///
/// The level is rounded to the nearest integer, then clamped to `0..=12`.
pub fn average_income(tech_level: f64) -> f64 {
    let tl = round_half_up(tech_level);
    AVERAGE_INCOME_BY_TL[clamped_index(tl, MAX_TECH_LEVEL)]
}

/// Military budget factor. Wartime looks up one control rating higher.
pub fn military_budget_factor(control_rating: i32, wartime: bool) -> f64 {
    let lookup = i64::from(control_rating) + i64::from(wartime);
    MILITARY_BUDGET_BY_CR[clamped_index(lookup, MAX_CONTROL_RATING)]
}

/// Revenue factor. Always looks up one rating above the taxation rating.
pub fn revenue_factor(taxation_rating: i32) -> f64 {
    let lookup = i64::from(taxation_rating) + 1;
    REVENUE_FACTOR_BY_CR[clamped_index(lookup, MAX_CONTROL_RATING)]
}
