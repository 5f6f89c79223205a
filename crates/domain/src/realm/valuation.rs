//! Realm valuation pipeline
//!
//! Every derived realm field is a pure function of raw inputs and the lookup
//! tables. Each function rounds its own output immediately; downstream
//! formulas consume the already-rounded value. Percentage-like inputs such as
//! the work/depend modifier are deliberately not clamped here.

use serde::{Deserialize, Serialize};

use crate::realm::PointModifier;
use crate::rounding::round_half_up;
use crate::tables;

/// Share of revenue lost to a corrupt government.
pub const CORRUPTION_LOSS: f64 = 0.2;

/// Share of realm value converted into resource points.
pub const RESOURCE_POINT_RATE: f64 = 0.001;

pub fn max_population(density_per_mile: f64, total_area: f64) -> i64 {
    round_half_up(density_per_mile * total_area)
}

/// Population × average income × work/depend modifier.
pub fn realm_value(population: f64, average_income: f64, work_depend_mod: f64) -> i64 {
    round_half_up(population * average_income * work_depend_mod)
}

/// Sum of `point_cost × level` over a modifier list.
pub fn modifiers_sum<'a, I>(items: I) -> i64
where
    I: IntoIterator<Item = &'a PointModifier>,
{
    items
        .into_iter()
        .fold(0i64, |acc, item| acc.saturating_add(item.computed_total()))
}

pub fn enhancements_sum(enhancements: &[PointModifier]) -> i64 {
    modifiers_sum(enhancements)
}

pub fn limitations_sum(limitations: &[PointModifier]) -> i64 {
    modifiers_sum(limitations)
}

/// Realm value adjusted by the enhancement and limitation percentages.
pub fn realm_value_with_modifiers(realm_value: i64, enhancements_sum: i64, limitations_sum: i64) -> i64 {
    let value = realm_value as f64;
    let enhancement_mod = value * enhancements_sum as f64 / 100.0;
    let limitation_mod = value * limitations_sum as f64 / 100.0;
    round_half_up(value + enhancement_mod + limitation_mod)
}

pub fn resource_point_cost(realm_value: i64) -> i64 {
    round_half_up(realm_value as f64 * RESOURCE_POINT_RATE)
}

pub fn military_resources(population: f64, average_income: f64, military_budget_factor: f64) -> i64 {
    round_half_up(population * average_income * military_budget_factor)
}

pub fn revenue(
    population: f64,
    average_income: f64,
    work_depend_mod: f64,
    revenue_factor: f64,
) -> i64 {
    round_half_up(population * average_income * work_depend_mod * revenue_factor)
}

/// Income adjustments applied on top of revenue each turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsModifiers {
    pub corrupt: bool,
    pub debt: bool,
    /// Percent of revenue lost to debt service
    pub debt_level: f64,
    pub independent_income: bool,
    /// Percent of revenue gained from independent income
    pub independent_income_level: f64,
}

/// Revenue after corruption, debt and independent income.
///
/// All adjustments are taken from the unadjusted revenue, and the result is
/// rounded once at the end.
pub fn earnings_at_turn(revenue: i64, modifiers: &EarningsModifiers) -> i64 {
    let base = revenue as f64;
    let mut earnings = base;

    if modifiers.corrupt {
        earnings -= base * CORRUPTION_LOSS;
    }
    if modifiers.debt && modifiers.debt_level > 0.0 {
        earnings -= base * (modifiers.debt_level / 100.0);
    }
    if modifiers.independent_income && modifiers.independent_income_level > 0.0 {
        earnings += base * (modifiers.independent_income_level / 100.0);
    }

    round_half_up(earnings)
}

/// Raw inputs that drive every derived realm field.
///
/// Missing fields take the same defaults as a new realm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RealmInputs {
    pub habitability: f64,
    pub total_area: f64,
    pub density_per_mile: f64,
    pub tech_level: f64,
    pub citizen_loyalty: f64,
    pub control_rating: i32,
    pub taxation_rating: i32,
    pub wartime: bool,
    pub population: f64,
    pub work_depend_mod: f64,
    pub earnings: EarningsModifiers,
    pub enhancements: Vec<PointModifier>,
    pub limitations: Vec<PointModifier>,
}

impl Default for RealmInputs {
    fn default() -> Self {
        Self {
            habitability: 0.0,
            total_area: 0.0,
            density_per_mile: 0.0,
            tech_level: 0.0,
            citizen_loyalty: 0.0,
            control_rating: 0,
            taxation_rating: 0,
            wartime: false,
            population: 0.0,
            work_depend_mod: 1.0,
            earnings: EarningsModifiers::default(),
            enhancements: Vec::new(),
            limitations: Vec::new(),
        }
    }
}

/// Every field derived from [`RealmInputs`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmComputedFields {
    pub habitability_label: String,
    pub citizen_loyalty_label: String,
    pub max_population: i64,
    pub average_income: f64,
    pub realm_value: i64,
    pub enhancements_sum: i64,
    pub limitations_sum: i64,
    pub realm_value_with_modifiers: i64,
    pub resource_point_cost: i64,
    pub military_budget_factor: f64,
    pub military_resources: i64,
    pub revenue_factor: f64,
    pub revenue: i64,
    pub earnings_at_turn: i64,
}

/// Recompute every derived field from raw inputs. Idempotent and side-effect free.
pub fn compute_realm_derived_fields(inputs: &RealmInputs) -> RealmComputedFields {
    let average_income = tables::average_income(inputs.tech_level);
    let realm_value = realm_value(inputs.population, average_income, inputs.work_depend_mod);
    let enhancements_sum = enhancements_sum(&inputs.enhancements);
    let limitations_sum = limitations_sum(&inputs.limitations);
    let military_budget_factor =
        tables::military_budget_factor(inputs.control_rating, inputs.wartime);
    let revenue_factor = tables::revenue_factor(inputs.taxation_rating);
    let revenue = revenue(
        inputs.population,
        average_income,
        inputs.work_depend_mod,
        revenue_factor,
    );

    RealmComputedFields {
        habitability_label: tables::habitability_label(inputs.habitability),
        citizen_loyalty_label: tables::citizen_loyalty_label(inputs.citizen_loyalty).to_string(),
        max_population: max_population(inputs.density_per_mile, inputs.total_area),
        average_income,
        realm_value,
        enhancements_sum,
        limitations_sum,
        realm_value_with_modifiers: realm_value_with_modifiers(
            realm_value,
            enhancements_sum,
            limitations_sum,
        ),
        resource_point_cost: resource_point_cost(realm_value),
        military_budget_factor,
        military_resources: military_resources(
            inputs.population,
            average_income,
            military_budget_factor,
        ),
        revenue_factor,
        revenue,
        earnings_at_turn: earnings_at_turn(revenue, &inputs.earnings),
    }
}
