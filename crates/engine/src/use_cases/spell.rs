//! Ritual Path magic use cases: crafting, saved spells, casting and quick
//! estimates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use realmforge_domain::magic::SpellSelection;
use realmforge_domain::{
    cast_spell, parse_modifier_list, ritual_estimate, CastRequest, CastingLimits, CastingResult,
    DiceRoller, DomainError, OwnerId, RandomDice, RitualEstimate, SpellCraft, SpellCraftId,
};

use crate::infrastructure::ports::{ClockPort, RepoError, SpellCraftRecord, SpellCraftRepo};
use crate::infrastructure::throttle::{ThrottleError, WriteThrottle};

#[derive(Debug, thiserror::Error)]
pub enum SpellError {
    #[error("Spell not found: {0}")]
    NotFound(SpellCraftId),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Throttled(#[from] ThrottleError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Quick estimate input; `modifiers` is free text like `"+2, -1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub ritual: String,
    pub path: String,
    pub power: i64,
    #[serde(default)]
    pub modifiers: String,
}

pub struct SpellService {
    repo: Arc<dyn SpellCraftRepo>,
    throttle: Arc<WriteThrottle>,
    clock: Arc<dyn ClockPort>,
    limits: CastingLimits,
}

impl SpellService {
    pub fn new(
        repo: Arc<dyn SpellCraftRepo>,
        throttle: Arc<WriteThrottle>,
        clock: Arc<dyn ClockPort>,
        limits: CastingLimits,
    ) -> Self {
        Self {
            repo,
            throttle,
            clock,
            limits,
        }
    }

    pub fn limits(&self) -> CastingLimits {
        self.limits
    }

    pub fn craft(&self, selection: SpellSelection) -> SpellCraft {
        let craft = SpellCraft::from(selection);
        tracing::debug!(
            spell = craft.name(),
            greater_effects = craft.greater_effects(),
            total_energy = craft.total_energy(),
            "Crafted spell"
        );
        craft
    }

    pub async fn save(
        &self,
        owner_id: OwnerId,
        craft: SpellCraft,
    ) -> Result<SpellCraftRecord, SpellError> {
        if craft.name().trim().is_empty() {
            return Err(DomainError::validation("spell name must not be empty").into());
        }

        let record = SpellCraftRecord::new(owner_id, craft, self.clock.now());
        let key = record.id.to_string();
        self.throttle.check(&key)?;
        match self.repo.save(&record).await {
            Ok(()) => {
                self.throttle.record_success(&key);
                tracing::info!(spell_id = %record.id, owner_id = %owner_id, "Saved spell");
                Ok(record)
            }
            Err(e) => {
                self.throttle.record_failure(&key);
                tracing::warn!(spell_id = %record.id, error = %e, "Failed to save spell");
                Err(e.into())
            }
        }
    }

    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<SpellCraftRecord>, SpellError> {
        Ok(self.repo.list_by_owner(owner_id).await?)
    }

    pub async fn delete(&self, owner_id: OwnerId, id: SpellCraftId) -> Result<(), SpellError> {
        match self.repo.get(id).await? {
            Some(record) if record.is_owned_by(owner_id) => {}
            _ => return Err(SpellError::NotFound(id)),
        }

        let key = id.to_string();
        self.throttle.check(&key)?;
        match self.repo.delete(id).await {
            Ok(()) => {
                self.throttle.forget(&key);
                tracing::info!(spell_id = %id, owner_id = %owner_id, "Deleted spell");
                Ok(())
            }
            Err(e) => {
                self.throttle.record_failure(&key);
                tracing::warn!(spell_id = %id, error = %e, "Failed to delete spell");
                Err(e.into())
            }
        }
    }

    /// Cast with fresh dice from the calling thread's RNG.
    pub fn cast(&self, request: &CastRequest) -> Result<CastingResult, SpellError> {
        self.cast_with(request, &mut RandomDice::thread_local())
    }

    /// Cast with the given dice. Requests must need positive energy.
    pub fn cast_with(
        &self,
        request: &CastRequest,
        dice: &mut dyn DiceRoller,
    ) -> Result<CastingResult, SpellError> {
        if request.required_energy <= 0 {
            return Err(DomainError::validation("requiredEnergy must be positive").into());
        }

        let result = cast_spell(request, &self.limits, dice);
        tracing::debug!(
            spell = %result.spell_name,
            rolls = result.rolls.len(),
            total_energy = result.total_energy,
            success = result.success,
            termination = ?result.termination,
            "Cast spell"
        );
        Ok(result)
    }

    pub fn estimate(&self, request: &EstimateRequest) -> RitualEstimate {
        self.estimate_with(request, &mut RandomDice::thread_local())
    }

    pub fn estimate_with(&self, request: &EstimateRequest, dice: &mut dyn DiceRoller) -> RitualEstimate {
        let modifiers = parse_modifier_list(&request.modifiers);
        ritual_estimate(
            request.ritual.clone(),
            request.path.clone(),
            request.power,
            &modifiers,
            dice,
        )
    }
}
