//! Realm sheet use cases.
//!
//! Every write goes through the [`WriteThrottle`] first and reports its
//! outcome back, so a failing store backs off instead of being hammered.
//! Realms belonging to someone else are reported as missing.

use std::sync::Arc;

use serde_json::Value;

use realmforge_domain::realm::{load_realm, RealmInputs};
use realmforge_domain::{
    compute_realm_derived_fields, DomainError, OwnerId, Realm, RealmComputedFields, RealmEdit,
    RealmId,
};

use crate::infrastructure::ports::{ClockPort, RealmRecord, RealmRepo, RepoError};
use crate::infrastructure::throttle::{ThrottleError, WriteThrottle};

#[derive(Debug, thiserror::Error)]
pub enum RealmError {
    #[error("Realm not found: {0}")]
    NotFound(RealmId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Throttled(#[from] ThrottleError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A realm serialized for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmExport {
    pub file_name: String,
    pub json: String,
}

pub struct RealmService {
    repo: Arc<dyn RealmRepo>,
    throttle: Arc<WriteThrottle>,
    clock: Arc<dyn ClockPort>,
}

impl RealmService {
    pub fn new(
        repo: Arc<dyn RealmRepo>,
        throttle: Arc<WriteThrottle>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            repo,
            throttle,
            clock,
        }
    }

    /// Derived fields for a set of raw inputs. Pure, never throttled.
    pub fn compute(&self, inputs: &RealmInputs) -> RealmComputedFields {
        let computed = compute_realm_derived_fields(inputs);
        tracing::debug!(
            realm_value = computed.realm_value,
            earnings_at_turn = computed.earnings_at_turn,
            "Computed realm fields"
        );
        computed
    }

    pub async fn create(&self, owner_id: OwnerId, name: &str) -> Result<RealmRecord, RealmError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("realm name must not be empty").into());
        }

        let record = RealmRecord::new(owner_id, Realm::new(name), self.clock.now());
        self.write(&record).await?;
        tracing::info!(realm_id = %record.id(), owner_id = %owner_id, "Created realm");
        Ok(record)
    }

    pub async fn get(&self, owner_id: OwnerId, id: RealmId) -> Result<RealmRecord, RealmError> {
        self.load_owned(owner_id, id).await
    }

    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<RealmRecord>, RealmError> {
        Ok(self.repo.list_by_owner(owner_id).await?)
    }

    /// Apply a batch of field edits. Either every edit lands or none does.
    pub async fn update(
        &self,
        owner_id: OwnerId,
        id: RealmId,
        edits: Vec<RealmEdit>,
    ) -> Result<RealmRecord, RealmError> {
        let mut record = self.load_owned(owner_id, id).await?;
        let edit_count = edits.len();
        record.realm.apply_all(edits)?;
        record.updated_at = self.clock.now();

        self.write(&record).await?;
        tracing::info!(realm_id = %id, owner_id = %owner_id, edit_count, "Updated realm");
        Ok(record)
    }

    /// Replace a realm with a whole document, migrating it if needed.
    pub async fn replace(
        &self,
        owner_id: OwnerId,
        id: RealmId,
        document: Value,
    ) -> Result<RealmRecord, RealmError> {
        let realm = load_realm(document)?;
        if realm.id() != id {
            return Err(DomainError::validation(format!(
                "document id {} does not match realm {id}",
                realm.id()
            ))
            .into());
        }

        let mut record = self.load_owned(owner_id, id).await?;
        record.realm = realm;
        record.updated_at = self.clock.now();

        self.write(&record).await?;
        tracing::info!(realm_id = %id, owner_id = %owner_id, "Replaced realm");
        Ok(record)
    }

    pub async fn delete(&self, owner_id: OwnerId, id: RealmId) -> Result<(), RealmError> {
        self.load_owned(owner_id, id).await?;

        let key = id.to_string();
        self.throttle.check(&key)?;
        match self.repo.delete(id).await {
            Ok(()) => {
                self.throttle.forget(&key);
                tracing::info!(realm_id = %id, owner_id = %owner_id, "Deleted realm");
                Ok(())
            }
            Err(e) => {
                self.throttle.record_failure(&key);
                tracing::warn!(realm_id = %id, error = %e, "Failed to delete realm");
                Err(e.into())
            }
        }
    }

    /// Pretty-printed current-schema JSON, named `<realm>-<unix millis>.json`.
    pub async fn export(&self, owner_id: OwnerId, id: RealmId) -> Result<RealmExport, RealmError> {
        let record = self.load_owned(owner_id, id).await?;
        let json = serde_json::to_string_pretty(&record.realm).map_err(RepoError::from)?;

        let stem = match record.realm.name().trim() {
            "" => "realm",
            name => name,
        };
        let file_name = format!("{stem}-{}.json", self.clock.now().timestamp_millis());
        Ok(RealmExport { file_name, json })
    }

    /// Load an exported document of any supported schema version as a new
    /// realm owned by `owner_id`.
    pub async fn import(&self, owner_id: OwnerId, json: &str) -> Result<RealmRecord, RealmError> {
        let document: Value = serde_json::from_str(json).map_err(DomainError::from)?;
        let realm = load_realm(document)?.with_new_id();

        let record = RealmRecord::new(owner_id, realm, self.clock.now());
        self.write(&record).await?;
        tracing::info!(realm_id = %record.id(), owner_id = %owner_id, "Imported realm");
        Ok(record)
    }

    async fn load_owned(&self, owner_id: OwnerId, id: RealmId) -> Result<RealmRecord, RealmError> {
        match self.repo.get(id).await? {
            Some(record) if record.is_owned_by(owner_id) => Ok(record),
            _ => Err(RealmError::NotFound(id)),
        }
    }

    async fn write(&self, record: &RealmRecord) -> Result<(), RealmError> {
        let key = record.id().to_string();
        self.throttle.check(&key)?;

        match self.repo.save(record).await {
            Ok(()) => {
                self.throttle.record_success(&key);
                Ok(())
            }
            Err(e) => {
                self.throttle.record_failure(&key);
                tracing::warn!(realm_id = %record.id(), error = %e, "Failed to save realm");
                Err(e.into())
            }
        }
    }
}
