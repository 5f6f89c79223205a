//! Realm aggregate
//!
//! A realm is edited field by field, but it is never observable in an
//! inconsistent state: the raw inputs are private and every mutation goes
//! through [`Realm::apply`], which finishes with a full recompute of the
//! derived fields.

use serde::{Deserialize, Serialize};

use crate::realm::schema::{RealmDocument, CURRENT_SCHEMA_VERSION};
use crate::realm::valuation::{
    compute_realm_derived_fields, EarningsModifiers, RealmComputedFields, RealmInputs,
};
use crate::{DomainError, RealmId};

/// A point-costed realm modifier (enhancement or limitation).
///
/// `total_cost` is always `point_cost × level`; it is stored for display and
/// refreshed on every recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointModifier {
    pub name: String,
    pub point_cost: i64,
    pub level: i64,
    #[serde(default)]
    pub total_cost: i64,
}

pub type EnhancementItem = PointModifier;
pub type LimitationItem = PointModifier;

impl PointModifier {
    /// Enhancement with a non-negative point cost.
    pub fn enhancement(name: impl Into<String>, point_cost: i64, level: i64) -> Self {
        Self::with_cost(name, point_cost.saturating_abs(), level)
    }

    /// Limitation; the point cost is stored negative regardless of the sign given.
    pub fn limitation(name: impl Into<String>, point_cost: i64, level: i64) -> Self {
        Self::with_cost(name, -point_cost.saturating_abs(), level)
    }

    fn with_cost(name: impl Into<String>, point_cost: i64, level: i64) -> Self {
        let mut item = Self {
            name: name.into(),
            point_cost,
            level,
            total_cost: 0,
        };
        item.total_cost = item.computed_total();
        item
    }

    pub fn computed_total(&self) -> i64 {
        self.point_cost.saturating_mul(self.level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePoint {
    pub name: String,
    #[serde(default)]
    pub points: i64,
}

impl ResourcePoint {
    pub fn new(name: impl Into<String>, points: i64) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

/// Names of the resource points every new realm starts with.
pub const DEFAULT_RESOURCE_POINTS: [&str; 6] = [
    "Agriculture",
    "Industry",
    "Trade",
    "Infrastructure",
    "Military",
    "Culture",
];

pub fn default_resource_points() -> Vec<ResourcePoint> {
    DEFAULT_RESOURCE_POINTS
        .iter()
        .map(|name| ResourcePoint::new(*name, 0))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Surroundings {
    pub habitability: f64,
    /// Square miles
    pub total_area: f64,
    /// Maximum inhabitants per square mile
    pub density_per_mile: f64,
    pub terrain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Government {
    pub government_type: String,
    pub control_rating: i32,
    pub taxation_rating: i32,
    pub corrupt: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Details {
    pub tech_level: f64,
    pub citizen_loyalty: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndependentIncome {
    pub name: String,
    /// Percent of revenue
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FundsAndPeople {
    pub population: f64,
    /// Fraction of the population that works, expected in `0..=1`
    pub work_depend_mod: f64,
    pub debt: bool,
    /// Percent of revenue
    pub debt_level: f64,
    pub independent_incomes: Vec<IndependentIncome>,
}

impl Default for FundsAndPeople {
    fn default() -> Self {
        Self {
            population: 0.0,
            work_depend_mod: 1.0,
            debt: false,
            debt_level: 0.0,
            independent_incomes: Vec::new(),
        }
    }
}

impl FundsAndPeople {
    /// Independent incomes collapse into one flag and one percentage.
    pub fn independent_income_level(&self) -> f64 {
        self.independent_incomes.iter().map(|i| i.level).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Military {
    pub wartime: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resources {
    pub resource_points: Vec<ResourcePoint>,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            resource_points: default_resource_points(),
        }
    }
}

/// A settlement sheet: raw inputs plus the fields derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RealmDocument", into = "RealmDocument")]
pub struct Realm {
    id: RealmId,
    name: String,
    surroundings: Surroundings,
    government: Government,
    details: Details,
    funds_and_people: FundsAndPeople,
    military: Military,
    resources: Resources,
    enhancements: Vec<EnhancementItem>,
    limitations: Vec<LimitationItem>,
    computed: RealmComputedFields,
}

impl Realm {
    /// A fresh realm with default inputs and a new id.
    pub fn new(name: impl Into<String>) -> Self {
        let mut realm = Self {
            id: RealmId::new(),
            name: name.into(),
            surroundings: Surroundings::default(),
            government: Government::default(),
            details: Details::default(),
            funds_and_people: FundsAndPeople::default(),
            military: Military::default(),
            resources: Resources::default(),
            enhancements: Vec::new(),
            limitations: Vec::new(),
            computed: RealmComputedFields::default(),
        };
        realm.recompute();
        realm
    }

    /// Same realm under a new identity (used on import).
    pub fn with_new_id(mut self) -> Self {
        self.id = RealmId::new();
        self
    }

    pub fn id(&self) -> RealmId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surroundings(&self) -> &Surroundings {
        &self.surroundings
    }

    pub fn government(&self) -> &Government {
        &self.government
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn funds_and_people(&self) -> &FundsAndPeople {
        &self.funds_and_people
    }

    pub fn military(&self) -> &Military {
        &self.military
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn enhancements(&self) -> &[EnhancementItem] {
        &self.enhancements
    }

    pub fn limitations(&self) -> &[LimitationItem] {
        &self.limitations
    }

    pub fn computed(&self) -> &RealmComputedFields {
        &self.computed
    }

    /// Snapshot of the raw inputs the valuation pipeline consumes.
    pub fn inputs(&self) -> RealmInputs {
        RealmInputs {
            habitability: self.surroundings.habitability,
            total_area: self.surroundings.total_area,
            density_per_mile: self.surroundings.density_per_mile,
            tech_level: self.details.tech_level,
            citizen_loyalty: self.details.citizen_loyalty,
            control_rating: self.government.control_rating,
            taxation_rating: self.government.taxation_rating,
            wartime: self.military.wartime,
            population: self.funds_and_people.population,
            work_depend_mod: self.funds_and_people.work_depend_mod,
            earnings: EarningsModifiers {
                corrupt: self.government.corrupt,
                debt: self.funds_and_people.debt,
                debt_level: self.funds_and_people.debt_level,
                independent_income: !self.funds_and_people.independent_incomes.is_empty(),
                independent_income_level: self.funds_and_people.independent_income_level(),
            },
            enhancements: self.enhancements.clone(),
            limitations: self.limitations.clone(),
        }
    }

    fn recompute(&mut self) {
        for item in self.enhancements.iter_mut().chain(self.limitations.iter_mut()) {
            item.total_cost = item.computed_total();
        }
        self.computed = compute_realm_derived_fields(&self.inputs());
    }

    /// Apply one field edit and recompute every derived field.
    ///
    /// On error the realm is left untouched.
    pub fn apply(&mut self, edit: super::RealmEdit) -> Result<(), DomainError> {
        edit.apply_to(self)?;
        self.recompute();
        Ok(())
    }

    /// Apply a batch of edits atomically: either all succeed or none is kept.
    pub fn apply_all<I>(&mut self, edits: I) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = super::RealmEdit>,
    {
        let mut draft = self.clone();
        for edit in edits {
            edit.apply_to(&mut draft)?;
        }
        draft.recompute();
        *self = draft;
        Ok(())
    }

    pub(crate) fn fields_mut(&mut self) -> RealmFieldsMut<'_> {
        RealmFieldsMut {
            name: &mut self.name,
            surroundings: &mut self.surroundings,
            government: &mut self.government,
            details: &mut self.details,
            funds_and_people: &mut self.funds_and_people,
            military: &mut self.military,
            resources: &mut self.resources,
            enhancements: &mut self.enhancements,
            limitations: &mut self.limitations,
        }
    }
}

/// Mutable view over the raw inputs, handed to edits.
pub(crate) struct RealmFieldsMut<'a> {
    pub name: &'a mut String,
    pub surroundings: &'a mut Surroundings,
    pub government: &'a mut Government,
    pub details: &'a mut Details,
    pub funds_and_people: &'a mut FundsAndPeople,
    pub military: &'a mut Military,
    pub resources: &'a mut Resources,
    pub enhancements: &'a mut Vec<EnhancementItem>,
    pub limitations: &'a mut Vec<LimitationItem>,
}

impl TryFrom<RealmDocument> for Realm {
    type Error = DomainError;

    fn try_from(doc: RealmDocument) -> Result<Self, Self::Error> {
        if doc.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(DomainError::UnsupportedSchemaVersion {
                found: doc.schema_version,
                supported: CURRENT_SCHEMA_VERSION,
            });
        }
        let mut realm = Self {
            id: doc.id,
            name: doc.name,
            surroundings: doc.surroundings,
            government: doc.government,
            details: doc.details,
            funds_and_people: doc.funds_and_people,
            military: doc.military,
            resources: doc.resources,
            enhancements: doc.enhancements,
            limitations: doc.limitations,
            computed: RealmComputedFields::default(),
        };
        realm.recompute();
        Ok(realm)
    }
}

impl From<Realm> for RealmDocument {
    fn from(realm: Realm) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            id: realm.id,
            name: realm.name,
            surroundings: realm.surroundings,
            government: realm.government,
            details: realm.details,
            funds_and_people: realm.funds_and_people,
            military: realm.military,
            resources: realm.resources,
            enhancements: realm.enhancements,
            limitations: realm.limitations,
            computed: Some(realm.computed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realm::RealmEdit;

    #[test]
    fn new_realm_has_defaults() {
        let realm = Realm::new("Avalon");
        assert_eq!(realm.name(), "Avalon");
        assert_eq!(realm.government().control_rating, 0);
        assert_eq!(realm.resources().resource_points.len(), 6);
        assert!(realm.resources().resource_points.iter().all(|rp| rp.points == 0));
        assert_eq!(realm.computed().realm_value, 0);
        assert_eq!(realm.computed().habitability_label, "Disastrous -3*");
    }

    #[test]
    fn new_realm_inputs_match_input_defaults() {
        assert_eq!(Realm::new("Avalon").inputs(), RealmInputs::default());
    }

    #[test]
    fn edits_trigger_recompute_and_keep_identity() {
        let mut realm = Realm::new("Avalon");
        let id = realm.id();

        realm.apply(RealmEdit::Population(1000.0)).unwrap();
        realm.apply(RealmEdit::TechLevel(3.0)).unwrap();
        realm.apply(RealmEdit::WorkDependMod(0.8)).unwrap();

        assert_eq!(realm.id(), id);
        assert_eq!(realm.computed().realm_value, 560_000);
        assert_eq!(realm.computed().resource_point_cost, 560);
    }

    #[test]
    fn limitation_cost_is_negative() {
        let item = PointModifier::limitation("Plague", 15, 2);
        assert_eq!(item.point_cost, -15);
        assert_eq!(item.total_cost, -30);
    }

    #[test]
    fn total_cost_is_refreshed_from_point_cost_and_level() {
        let mut realm = Realm::new("Avalon");
        realm
            .apply(RealmEdit::AddEnhancement(PointModifier {
                name: "Stale".into(),
                point_cost: 5,
                level: 3,
                total_cost: 999,
            }))
            .unwrap();
        assert_eq!(realm.enhancements()[0].total_cost, 15);
        assert_eq!(realm.computed().enhancements_sum, 15);
    }

    #[test]
    fn independent_incomes_feed_earnings() {
        let mut realm = Realm::new("Avalon");
        realm
            .apply_all([
                RealmEdit::Population(1000.0),
                RealmEdit::TechLevel(3.0),
                RealmEdit::WorkDependMod(1.0),
                RealmEdit::TaxationRating(3),
                RealmEdit::AddIndependentIncome(IndependentIncome {
                    name: "Silver mine".into(),
                    level: 10.0,
                }),
                RealmEdit::AddIndependentIncome(IndependentIncome {
                    name: "Tolls".into(),
                    level: 5.0,
                }),
            ])
            .unwrap();
        // revenue = 1000 * 700 * 1.0 * 0.1 = 70000; +15%
        assert_eq!(realm.computed().revenue, 70_000);
        assert_eq!(realm.computed().earnings_at_turn, 80_500);
    }

    #[test]
    fn failed_batch_leaves_realm_untouched() {
        let mut realm = Realm::new("Avalon");
        let before = realm.clone();
        let result = realm.apply_all([
            RealmEdit::Population(500.0),
            RealmEdit::RemoveEnhancement(3),
        ]);
        assert!(result.is_err());
        assert_eq!(realm, before);
    }

    #[test]
    fn json_round_trip_is_exact() {
        let mut realm = Realm::new("Avalon");
        realm
            .apply_all([
                RealmEdit::Habitability(11.5),
                RealmEdit::TotalArea(1234.5),
                RealmEdit::DensityPerMile(37.25),
                RealmEdit::Population(45_678.0),
                RealmEdit::WorkDependMod(0.65),
                RealmEdit::TechLevel(4.0),
                RealmEdit::ControlRating(3),
                RealmEdit::Wartime(true),
                RealmEdit::AddEnhancement(PointModifier::enhancement("Fertile", 10, 1)),
                RealmEdit::AddEnhancement(PointModifier::enhancement("Walls", 5, 2)),
                RealmEdit::AddLimitation(PointModifier::limitation("Remote", 10, 1)),
                RealmEdit::SetResourcePoints {
                    index: 2,
                    points: 7,
                },
            ])
            .unwrap();

        let json = serde_json::to_string(&realm).unwrap();
        let restored: Realm = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, realm);
        assert_eq!(restored.enhancements()[1].name, "Walls");
        assert_eq!(restored.resources().resource_points[2].points, 7);
    }

    #[test]
    fn serialized_realm_carries_schema_version_and_computed_fields() {
        let realm = Realm::new("Avalon");
        let value = serde_json::to_value(&realm).unwrap();
        assert_eq!(value["schemaVersion"], CURRENT_SCHEMA_VERSION);
        assert!(value["computed"]["realmValue"].is_i64());
        assert!(value["fundsAndPeople"]["independentIncomes"].is_array());
    }
}
