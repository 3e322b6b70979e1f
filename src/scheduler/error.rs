use thiserror::Error;
use uuid::Uuid;

use crate::srs::{InvalidQuality, LearnerId};
use crate::storage::StoreError;
use crate::vocab::WordId;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("{0}")]
    InvalidQuality(#[from] InvalidQuality),

    #[error("No progress for learner {learner} on word {word}")]
    NotFound { learner: LearnerId, word: WordId },

    #[error("Unknown word: {0}")]
    UnknownWord(WordId),

    #[error("Not enough words: need {needed}, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Session {id} is a {found} session, not a {expected} session")]
    SessionKindMismatch {
        id: Uuid,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
}

impl From<StoreError> for SchedulerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProgressNotFound { learner, word } => Self::NotFound { learner, word },
            StoreError::WordNotFound(id) => Self::UnknownWord(id),
            other => Self::StoreUnavailable(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
