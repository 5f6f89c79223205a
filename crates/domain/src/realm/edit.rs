//! Field-level realm edits
//!
//! Each variant changes exactly one raw input (or one list entry). Derived
//! fields are never editable; the aggregate recomputes them after every edit.

use serde::{Deserialize, Serialize};

use crate::realm::model::{IndependentIncome, PointModifier, Realm, ResourcePoint};
use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum RealmEdit {
    Name(String),

    // Surroundings
    Habitability(f64),
    TotalArea(f64),
    DensityPerMile(f64),
    Terrain(String),

    // Government
    GovernmentType(String),
    ControlRating(i32),
    TaxationRating(i32),
    Corrupt(bool),

    // Details
    TechLevel(f64),
    CitizenLoyalty(f64),
    Notes(String),

    // Funds and people
    Population(f64),
    WorkDependMod(f64),
    Debt(bool),
    DebtLevel(f64),
    AddIndependentIncome(IndependentIncome),
    RemoveIndependentIncome(usize),

    // Military
    Wartime(bool),

    // Modifiers
    AddEnhancement(PointModifier),
    SetEnhancementLevel { index: usize, level: i64 },
    RemoveEnhancement(usize),
    AddLimitation(PointModifier),
    SetLimitationLevel { index: usize, level: i64 },
    RemoveLimitation(usize),

    // Resources
    AddResourcePoint(ResourcePoint),
    SetResourcePoints { index: usize, points: i64 },
    RemoveResourcePoint(usize),
}

fn check_index(len: usize, index: usize, list: &str) -> Result<(), DomainError> {
    if index < len {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "{list} index {index} out of range (len {len})"
        )))
    }
}

impl RealmEdit {
    /// Mutate raw inputs only. The caller recomputes.
    pub(crate) fn apply_to(self, realm: &mut Realm) -> Result<(), DomainError> {
        let f = realm.fields_mut();
        match self {
            Self::Name(name) => {
                if name.trim().is_empty() {
                    return Err(DomainError::validation("Realm name cannot be empty"));
                }
                *f.name = name;
            }

            Self::Habitability(v) => f.surroundings.habitability = v,
            Self::TotalArea(v) => f.surroundings.total_area = v,
            Self::DensityPerMile(v) => f.surroundings.density_per_mile = v,
            Self::Terrain(v) => f.surroundings.terrain = v,

            Self::GovernmentType(v) => f.government.government_type = v,
            Self::ControlRating(v) => f.government.control_rating = v,
            Self::TaxationRating(v) => f.government.taxation_rating = v,
            Self::Corrupt(v) => f.government.corrupt = v,

            Self::TechLevel(v) => f.details.tech_level = v,
            Self::CitizenLoyalty(v) => f.details.citizen_loyalty = v,
            Self::Notes(v) => f.details.notes = v,

            Self::Population(v) => f.funds_and_people.population = v,
            Self::WorkDependMod(v) => f.funds_and_people.work_depend_mod = v,
            Self::Debt(v) => f.funds_and_people.debt = v,
            Self::DebtLevel(v) => f.funds_and_people.debt_level = v,
            Self::AddIndependentIncome(income) => {
                f.funds_and_people.independent_incomes.push(income)
            }
            Self::RemoveIndependentIncome(index) => {
                let list = &mut f.funds_and_people.independent_incomes;
                check_index(list.len(), index, "Independent income")?;
                list.remove(index);
            }

            Self::Wartime(v) => f.military.wartime = v,

            Self::AddEnhancement(item) => f.enhancements.push(item),
            Self::SetEnhancementLevel { index, level } => {
                check_index(f.enhancements.len(), index, "Enhancement")?;
                f.enhancements[index].level = level;
            }
            Self::RemoveEnhancement(index) => {
                check_index(f.enhancements.len(), index, "Enhancement")?;
                f.enhancements.remove(index);
            }
            Self::AddLimitation(item) => f.limitations.push(item),
            Self::SetLimitationLevel { index, level } => {
                check_index(f.limitations.len(), index, "Limitation")?;
                f.limitations[index].level = level;
            }
            Self::RemoveLimitation(index) => {
                check_index(f.limitations.len(), index, "Limitation")?;
                f.limitations.remove(index);
            }

            Self::AddResourcePoint(rp) => f.resources.resource_points.push(rp),
            Self::SetResourcePoints { index, points } => {
                let list = &mut f.resources.resource_points;
                check_index(list.len(), index, "Resource point")?;
                list[index].points = points;
            }
            Self::RemoveResourcePoint(index) => {
                let list = &mut f.resources.resource_points;
                check_index(list.len(), index, "Resource point")?;
                list.remove(index);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_edits() {
        let edit: RealmEdit =
            serde_json::from_str(r#"{"field":"controlRating","value":5}"#).unwrap();
        assert_eq!(edit, RealmEdit::ControlRating(5));

        let edit: RealmEdit =
            serde_json::from_str(r#"{"field":"setResourcePoints","value":{"index":1,"points":4}}"#)
                .unwrap();
        assert_eq!(edit, RealmEdit::SetResourcePoints { index: 1, points: 4 });
    }

    #[test]
    fn rejects_blank_name() {
        let mut realm = Realm::new("Avalon");
        let err = realm.apply(RealmEdit::Name("   ".into())).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(realm.name(), "Avalon");
    }

    #[test]
    fn out_of_range_index_is_a_validation_error() {
        let mut realm = Realm::new("Avalon");
        let err = realm
            .apply(RealmEdit::SetResourcePoints { index: 6, points: 1 })
            .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn level_change_updates_totals() {
        let mut realm = Realm::new("Avalon");
        realm
            .apply(RealmEdit::AddLimitation(PointModifier::limitation("Isolated", 5, 1)))
            .unwrap();
        realm
            .apply(RealmEdit::SetLimitationLevel { index: 0, level: 3 })
            .unwrap();
        assert_eq!(realm.limitations()[0].total_cost, -15);
        assert_eq!(realm.computed().limitations_sum, -15);
    }

    #[test]
    fn removing_resource_points_keeps_order() {
        let mut realm = Realm::new("Avalon");
        realm.apply(RealmEdit::RemoveResourcePoint(0)).unwrap();
        let names: Vec<_> = realm
            .resources()
            .resource_points
            .iter()
            .map(|rp| rp.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Industry", "Trade", "Infrastructure", "Military", "Culture"]
        );
    }
}
