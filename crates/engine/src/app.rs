//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    memory::{InMemoryRealmRepo, InMemorySpellCraftRepo},
    ports::{ClockPort, RealmRepo, SpellCraftRepo},
    throttle::WriteThrottle,
};
use crate::use_cases::{RealmService, SpellService};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

pub struct UseCases {
    pub realms: Arc<RealmService>,
    pub spells: Arc<SpellService>,
}

impl App {
    pub fn new(
        realm_repo: Arc<dyn RealmRepo>,
        spell_repo: Arc<dyn SpellCraftRepo>,
        clock: Arc<dyn ClockPort>,
        config: &EngineConfig,
    ) -> Self {
        // One throttle for every document; ids never collide across kinds.
        let throttle = Arc::new(WriteThrottle::new(config.throttle, clock.clone()));

        let realms = Arc::new(RealmService::new(realm_repo, throttle.clone(), clock.clone()));
        let spells = Arc::new(SpellService::new(
            spell_repo,
            throttle,
            clock,
            config.casting,
        ));

        Self {
            use_cases: UseCases { realms, spells },
        }
    }

    /// Wire the app against process-local stores and the system clock.
    pub fn in_memory(config: &EngineConfig) -> Self {
        Self::new(
            Arc::new(InMemoryRealmRepo::new()),
            Arc::new(InMemorySpellCraftRepo::new()),
            Arc::new(SystemClock::new()),
            config,
        )
    }
}
