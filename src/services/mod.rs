//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod members;
pub mod penalties;
pub mod penalty_engine;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

pub use penalty_engine::PenaltyDerivationEngine;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub members: members::MembersService,
    pub circulation: circulation::CirculationService,
    pub penalties: penalties::PenaltiesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let engine = PenaltyDerivationEngine::new(&config.penalties)?;

        Ok(Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            members: members::MembersService::new(repository.clone()),
            circulation: circulation::CirculationService::new(
                Arc::new(repository.clone()),
                engine,
                config.loans.clone(),
            ),
            penalties: penalties::PenaltiesService::new(repository),
        })
    }
}
