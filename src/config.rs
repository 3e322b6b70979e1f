//! Engine configuration loaded from a TOML file

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::srs::{DEFAULT_DAILY_NEW_WORDS, DEFAULT_DAILY_REVIEW_LIMIT};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

/// Tunables for selection quotas and session sizes.
///
/// ```toml
/// database_path = "/var/lib/lexis/lexis.db"
/// default_daily_review_limit = 20
/// default_daily_new_words = 5
/// quiz_length = 10
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQLite database; defaults to the local data directory
    pub database_path: Option<PathBuf>,
    /// Limits seeded into newly created learner profiles
    pub default_daily_review_limit: u32,
    pub default_daily_new_words: u32,
    /// Answers after which a quiz finishes
    pub quiz_length: usize,
    pub flashcard_deck_size: usize,
    pub game_min_words: usize,
    /// Repetition count from which a word counts as learned
    pub learned_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            default_daily_review_limit: DEFAULT_DAILY_REVIEW_LIMIT,
            default_daily_new_words: DEFAULT_DAILY_NEW_WORDS,
            quiz_length: 10,
            flashcard_deck_size: 10,
            game_min_words: 6,
            learned_threshold: 4,
        }
    }
}

impl EngineConfig {
    /// Load from a file, using defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Get the default data directory
    pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
        dirs::data_local_dir()
            .map(|p| p.join("lexis"))
            .ok_or(ConfigError::DataDirNotFound)
    }

    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::default_data_dir()?.join("config.toml"))
    }

    /// Database location, falling back to `<data dir>/lexis.db`
    pub fn resolve_database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::default_data_dir()?.join("lexis.db")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_toml("quiz_length = 3\ndefault_daily_new_words = 0\n").unwrap();
        assert_eq!(config.quiz_length, 3);
        assert_eq!(config.default_daily_new_words, 0);
        assert_eq!(config.default_daily_review_limit, 20);
        assert_eq!(config.learned_threshold, 4);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "database_path = \"/tmp/x.db\"\ngame_min_words = 4\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.game_min_words, 4);
        assert_eq!(config.resolve_database_path().unwrap(), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EngineConfig::from_toml("quiz_length = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
