use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::models::{ClothingRecord, TemperatureBounds};
use crate::services::{
    Catalog, ImageStore, Query, RandomSource, Recommender, SeededRandom, SessionStore,
    ThreadRandom,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup, never mutated
    pub catalog: Arc<Catalog>,
    pub images: ImageStore,
    pub bounds: TemperatureBounds,
    pub sessions: Arc<SessionStore>,
    rng: Arc<Mutex<Box<dyn RandomSource>>>,
}

/// Outcome of a recommendation query, detached from the catalog borrow
#[derive(Debug, Clone, PartialEq)]
pub struct Pick {
    pub record: ClothingRecord,
    pub candidates: usize,
}

impl AppState {
    /// Creates state around a loaded catalog, sampling with a thread RNG
    pub fn new(catalog: Catalog, images: ImageStore, bounds: TemperatureBounds) -> Self {
        Self {
            catalog: Arc::new(catalog),
            images,
            bounds,
            sessions: Arc::new(SessionStore::default()),
            rng: Arc::new(Mutex::new(Box::new(ThreadRandom))),
        }
    }

    /// Builds state from configuration and an already loaded catalog
    pub fn from_config(config: &Config, catalog: Catalog) -> anyhow::Result<Self> {
        let bounds = config.temperature_bounds()?;
        let state = Self::new(catalog, ImageStore::new(&config.image_dir), bounds)
            .with_sessions(config.session_store()?);
        Ok(match config.random_seed {
            Some(seed) => state.with_random_source(SeededRandom::new(seed)),
            None => state,
        })
    }

    /// Replaces the session store, e.g. to change expiry or the cap
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Arc::new(sessions);
        self
    }

    /// Replaces the sampler used to choose among matching records
    pub fn with_random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Arc::new(Mutex::new(Box::new(rng)));
        self
    }

    /// Runs a query against the catalog, `None` when nothing matches
    pub fn recommend(&self, query: &Query) -> Option<Pick> {
        let recommender = Recommender::new(self.catalog.records());
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        recommender
            .recommend(query, &mut **rng)
            .map(|hit| Pick {
                record: hit.record.clone(),
                candidates: hit.candidates,
            })
    }
}
