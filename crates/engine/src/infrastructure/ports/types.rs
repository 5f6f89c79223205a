//! Stored document envelopes.
//!
//! Domain values carry no ownership or timestamps; the persistence layer
//! wraps them so every stored document is keyed by id and owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use realmforge_domain::{OwnerId, Realm, RealmId, SpellCraft, SpellCraftId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmRecord {
    pub owner_id: OwnerId,
    pub realm: Realm,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RealmRecord {
    pub fn new(owner_id: OwnerId, realm: Realm, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            realm,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> RealmId {
        self.realm.id()
    }

    pub fn is_owned_by(&self, owner_id: OwnerId) -> bool {
        self.owner_id == owner_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellCraftRecord {
    pub id: SpellCraftId,
    pub owner_id: OwnerId,
    pub craft: SpellCraft,
    pub created_at: DateTime<Utc>,
}

impl SpellCraftRecord {
    pub fn new(owner_id: OwnerId, craft: SpellCraft, now: DateTime<Utc>) -> Self {
        Self {
            id: SpellCraftId::new(),
            owner_id,
            craft,
            created_at: now,
        }
    }

    pub fn is_owned_by(&self, owner_id: OwnerId) -> bool {
        self.owner_id == owner_id
    }
}
