//! In-memory document stores.
//!
//! Documents are kept as whole records in a [`DashMap`]; every save replaces
//! the stored copy, matching the whole-document semantics of the ports.

use async_trait::async_trait;
use dashmap::DashMap;

use realmforge_domain::{OwnerId, RealmId, SpellCraftId};

use crate::infrastructure::ports::{
    RealmRecord, RealmRepo, RepoError, SpellCraftRecord, SpellCraftRepo,
};

#[derive(Default)]
pub struct InMemoryRealmRepo {
    realms: DashMap<RealmId, RealmRecord>,
}

impl InMemoryRealmRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RealmRepo for InMemoryRealmRepo {
    async fn get(&self, id: RealmId) -> Result<Option<RealmRecord>, RepoError> {
        Ok(self.realms.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<RealmRecord>, RepoError> {
        let mut records: Vec<RealmRecord> = self
            .realms
            .iter()
            .filter(|entry| entry.is_owned_by(owner_id))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }

    async fn save(&self, record: &RealmRecord) -> Result<(), RepoError> {
        self.realms.insert(record.id(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: RealmId) -> Result<(), RepoError> {
        self.realms
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("Realm", id))
    }
}

#[derive(Default)]
pub struct InMemorySpellCraftRepo {
    spells: DashMap<SpellCraftId, SpellCraftRecord>,
}

impl InMemorySpellCraftRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpellCraftRepo for InMemorySpellCraftRepo {
    async fn get(&self, id: SpellCraftId) -> Result<Option<SpellCraftRecord>, RepoError> {
        Ok(self.spells.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<SpellCraftRecord>, RepoError> {
        let mut records: Vec<SpellCraftRecord> = self
            .spells
            .iter()
            .filter(|entry| entry.is_owned_by(owner_id))
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }

    async fn save(&self, record: &SpellCraftRecord) -> Result<(), RepoError> {
        self.spells.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete(&self, id: SpellCraftId) -> Result<(), RepoError> {
        self.spells
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found("SpellCraft", id))
    }
}
