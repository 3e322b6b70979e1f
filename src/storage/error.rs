use thiserror::Error;

use crate::srs::LearnerId;
use crate::vocab::WordId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Word not found: {0}")]
    WordNotFound(WordId),

    #[error("No progress for learner {learner} on word {word}")]
    ProgressNotFound { learner: LearnerId, word: WordId },

    #[error("Store lock poisoned")]
    Poisoned,

    /// Raised by external store implementations that cannot be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
