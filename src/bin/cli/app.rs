use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use lexis_lib::config::EngineConfig;
use lexis_lib::scheduler::Scheduler;
use lexis_lib::session::Trainer;
use lexis_lib::srs::LearnerId;
use lexis_lib::storage::SqliteStore;

/// Shared application state for CLI commands
pub struct App {
    pub learner: LearnerId,
    pub store: Arc<SqliteStore>,
    pub scheduler: Arc<Scheduler>,
    pub trainer: Trainer,
}

impl App {
    /// Load config and open the database
    pub fn new(db: Option<PathBuf>, config_path: Option<&Path>, learner: LearnerId) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => EngineConfig::default_config_path()
                .context("Failed to get data directory")?,
        };
        let config = EngineConfig::load(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

        let db_path = match db {
            Some(path) => path,
            None => config
                .resolve_database_path()
                .context("Failed to get data directory")?,
        };
        let store = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?
            .with_profile_defaults(config.default_daily_review_limit, config.default_daily_new_words);
        log::debug!("Using database {}", db_path.display());

        let store = Arc::new(store);
        let scheduler = Arc::new(Scheduler::from_store(store.clone(), config));
        let trainer = Trainer::new(scheduler.clone());

        Ok(Self {
            learner,
            store,
            scheduler,
            trainer,
        })
    }

    pub fn rng(&self) -> StdRng {
        StdRng::from_entropy()
    }
}
