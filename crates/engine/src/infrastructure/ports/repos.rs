//! Repository port traits for document storage.

use async_trait::async_trait;

use realmforge_domain::{OwnerId, RealmId, SpellCraftId};

use super::error::RepoError;
use super::types::{RealmRecord, SpellCraftRecord};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RealmRepo: Send + Sync {
    async fn get(&self, id: RealmId) -> Result<Option<RealmRecord>, RepoError>;
    /// Ordered by creation time, oldest first.
    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<RealmRecord>, RepoError>;
    /// Insert or overwrite the whole document.
    async fn save(&self, record: &RealmRecord) -> Result<(), RepoError>;
    async fn delete(&self, id: RealmId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpellCraftRepo: Send + Sync {
    async fn get(&self, id: SpellCraftId) -> Result<Option<SpellCraftRecord>, RepoError>;
    async fn list_by_owner(&self, owner_id: OwnerId) -> Result<Vec<SpellCraftRecord>, RepoError>;
    async fn save(&self, record: &SpellCraftRecord) -> Result<(), RepoError>;
    async fn delete(&self, id: SpellCraftId) -> Result<(), RepoError>;
}
