//! Versioned realm documents
//!
//! Stored and exported realms are JSON documents tagged with `schemaVersion`.
//! Older documents are upgraded exactly once, at load time, by [`migrate`];
//! nothing downstream ever checks for optional legacy fields.
//!
//! ## Versions
//!
//! - **1** (untagged): `fundsAndPeople.independentIncome: bool` plus
//!   `fundsAndPeople.independentIncomeLevel: number`. Exporters of this era
//!   could also omit the modifier and resource-point arrays entirely.
//! - **2**: `fundsAndPeople.independentIncomes: [{ name, level }]`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::realm::model::{
    Details, EnhancementItem, FundsAndPeople, Government, LimitationItem, Military, Realm,
    Resources, Surroundings,
};
use crate::realm::valuation::RealmComputedFields;
use crate::{DomainError, RealmId};

pub const CURRENT_SCHEMA_VERSION: u32 = 2;
pub const LEGACY_SCHEMA_VERSION: u32 = 1;

/// Name given to the single income entry migrated out of a v1 document.
pub const MIGRATED_INCOME_NAME: &str = "Independent income";

const SCHEMA_VERSION_KEY: &str = "schemaVersion";

fn legacy_version() -> u32 {
    LEGACY_SCHEMA_VERSION
}

/// Wire shape of a realm. `computed` is written for readers but ignored on
/// the way in; derived fields are always recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmDocument {
    #[serde(default = "legacy_version")]
    pub schema_version: u32,
    pub id: RealmId,
    pub name: String,
    pub surroundings: Surroundings,
    pub government: Government,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub funds_and_people: FundsAndPeople,
    #[serde(default)]
    pub military: Military,
    pub resources: Resources,
    #[serde(default)]
    pub enhancements: Vec<EnhancementItem>,
    #[serde(default)]
    pub limitations: Vec<LimitationItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed: Option<RealmComputedFields>,
}

fn object_mut<'a>(value: &'a mut Value, what: &str) -> Result<&'a mut Map<String, Value>, DomainError> {
    value
        .as_object_mut()
        .ok_or_else(|| DomainError::malformed(format!("{what} must be a JSON object")))
}

fn require_object(doc: &Map<String, Value>, key: &str) -> Result<(), DomainError> {
    match doc.get(key) {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(DomainError::malformed(format!("missing `{key}` section"))),
    }
}

fn version_of(doc: &Map<String, Value>) -> Result<u32, DomainError> {
    match doc.get(SCHEMA_VERSION_KEY) {
        None | Some(Value::Null) => Ok(LEGACY_SCHEMA_VERSION),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| DomainError::malformed("schemaVersion must be a positive integer")),
    }
}

/// v1 → v2: fold the boolean income flag into a list.
fn upgrade_v1(doc: &mut Map<String, Value>) -> Result<(), DomainError> {
    let funds = doc
        .entry("fundsAndPeople")
        .or_insert_with(|| Value::Object(Map::new()));
    let funds = object_mut(funds, "fundsAndPeople")?;

    let enabled = funds
        .remove("independentIncome")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let level = funds
        .remove("independentIncomeLevel")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);

    if !funds.contains_key("independentIncomes") {
        let incomes = if enabled {
            json!([{ "name": MIGRATED_INCOME_NAME, "level": level }])
        } else {
            json!([])
        };
        funds.insert("independentIncomes".to_string(), incomes);
    }
    Ok(())
}

/// Upgrade a realm document of any known version to [`CURRENT_SCHEMA_VERSION`].
///
/// Also fills in list sections that older exporters left out, and an id for
/// hand-written documents that lack one. The document
/// must have a non-empty `name` and `surroundings`, `government` and
/// `resources` sections.
pub fn migrate(mut value: Value) -> Result<Value, DomainError> {
    let doc = object_mut(&mut value, "realm document")?;

    let has_name = doc
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return Err(DomainError::malformed("realm document has no name"));
    }
    for section in ["surroundings", "government", "resources"] {
        require_object(doc, section)?;
    }

    let version = version_of(doc)?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(DomainError::UnsupportedSchemaVersion {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }
    if version == 0 {
        return Err(DomainError::malformed("schemaVersion must be a positive integer"));
    }

    if version == LEGACY_SCHEMA_VERSION {
        upgrade_v1(doc)?;
    }
    doc.insert(SCHEMA_VERSION_KEY.to_string(), json!(CURRENT_SCHEMA_VERSION));

    for list in ["enhancements", "limitations"] {
        doc.entry(list).or_insert_with(|| json!([]));
    }
    doc.entry("id")
        .or_insert_with(|| Value::String(RealmId::new().to_string()));
    if let Some(Value::Object(resources)) = doc.get_mut("resources") {
        resources
            .entry("resourcePoints")
            .or_insert_with(|| json!([]));
    }

    Ok(value)
}

/// Migrate, then decode into a consistent [`Realm`].
pub fn load_realm(value: Value) -> Result<Realm, DomainError> {
    let migrated = migrate(value)?;
    Ok(serde_json::from_value(migrated)?)
}

pub fn load_realm_str(json: &str) -> Result<Realm, DomainError> {
    let value: Value = serde_json::from_str(json)?;
    load_realm(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_document() -> Value {
        json!({
            "id": "6f1c1f7a-3f0b-4a8e-9d3c-2b1f4f8f0a11",
            "name": "Old Keep",
            "surroundings": { "habitability": 10, "totalArea": 100, "densityPerMile": 10 },
            "government": { "controlRating": 2, "taxationRating": 3, "corrupt": false },
            "details": { "techLevel": 3 },
            "fundsAndPeople": {
                "population": 1000,
                "workDependMod": 1,
                "independentIncome": true,
                "independentIncomeLevel": 10
            },
            "military": { "wartime": false },
            "resources": {}
        })
    }

    #[test]
    fn upgrades_v1_income_flag_to_list() {
        let migrated = migrate(v1_document()).unwrap();
        assert_eq!(migrated["schemaVersion"], 2);
        let funds = &migrated["fundsAndPeople"];
        assert!(funds.get("independentIncome").is_none());
        assert!(funds.get("independentIncomeLevel").is_none());
        assert_eq!(funds["independentIncomes"][0]["name"], MIGRATED_INCOME_NAME);
        assert_eq!(funds["independentIncomes"][0]["level"], 10.0);
    }

    #[test]
    fn disabled_v1_income_becomes_empty_list() {
        let mut doc = v1_document();
        doc["fundsAndPeople"]["independentIncome"] = json!(false);
        let migrated = migrate(doc).unwrap();
        assert_eq!(migrated["fundsAndPeople"]["independentIncomes"], json!([]));
    }

    #[test]
    fn fills_missing_lists() {
        let migrated = migrate(v1_document()).unwrap();
        assert_eq!(migrated["enhancements"], json!([]));
        assert_eq!(migrated["limitations"], json!([]));
        assert_eq!(migrated["resources"]["resourcePoints"], json!([]));
    }

    #[test]
    fn assigns_an_id_when_missing() {
        let mut doc = v1_document();
        doc.as_object_mut().unwrap().remove("id");
        let realm = load_realm(doc).unwrap();
        assert_eq!(realm.name(), "Old Keep");
    }

    #[test]
    fn loads_v1_into_consistent_realm() {
        let realm = load_realm(v1_document()).unwrap();
        assert_eq!(realm.name(), "Old Keep");
        // revenue = 1000 * 700 * 1 * 0.1 = 70000, +10% independent income
        assert_eq!(realm.computed().revenue, 70_000);
        assert_eq!(realm.computed().earnings_at_turn, 77_000);
    }

    #[test]
    fn current_documents_pass_through() {
        let realm = Realm::new("Fresh");
        let value = serde_json::to_value(&realm).unwrap();
        let migrated = migrate(value.clone()).unwrap();
        assert_eq!(migrated, value);
        assert_eq!(load_realm(value).unwrap(), realm);
    }

    #[test]
    fn rejects_future_versions() {
        let mut doc = v1_document();
        doc["schemaVersion"] = json!(99);
        let err = migrate(doc).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnsupportedSchemaVersion {
                found: 99,
                supported: CURRENT_SCHEMA_VERSION
            }
        );
    }

    #[test]
    fn rejects_documents_missing_required_sections() {
        let mut doc = v1_document();
        doc.as_object_mut().unwrap().remove("government");
        assert!(matches!(
            migrate(doc),
            Err(DomainError::MalformedDocument(_))
        ));

        let mut doc = v1_document();
        doc["name"] = json!("");
        assert!(migrate(doc).is_err());

        assert!(migrate(json!([1, 2, 3])).is_err());
    }

    #[test]
    fn direct_decode_of_legacy_document_is_refused() {
        let err = serde_json::from_value::<Realm>(v1_document()).unwrap_err();
        assert!(err.to_string().contains("Unsupported schema version"));
    }

    #[test]
    fn load_from_str_reports_bad_json() {
        assert!(matches!(
            load_realm_str("{ not json"),
            Err(DomainError::MalformedDocument(_))
        ));
    }
}
