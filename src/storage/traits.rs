//! Collaborator interfaces the scheduler reads from and writes to

use chrono::{DateTime, Utc};

use super::error::Result;
use crate::srs::{LearnerId, LearnerProfile, LearnerWordState};
use crate::vocab::{NewWord, Word, WordId};

/// Read access to the shared vocabulary
pub trait VocabularyStore: Send + Sync {
    fn all_words(&self) -> Result<Vec<Word>>;

    /// Every word whose id is not in `excluded`
    fn words_excluding(&self, excluded: &[WordId]) -> Result<Vec<Word>>;

    fn get_word(&self, id: WordId) -> Result<Option<Word>>;

    /// Vocabulary management entry point; never called by the scheduler
    fn add_word(&self, word: NewWord) -> Result<Word>;
}

/// Durable per-(learner, word) scheduling state
pub trait ProgressStore: Send + Sync {
    fn get(&self, learner: LearnerId, word: WordId) -> Result<Option<LearnerWordState>>;

    /// Get-or-create. An existing record is returned unchanged, so at most
    /// one record ever exists per pair.
    fn create(
        &self,
        learner: LearnerId,
        word: WordId,
        next_review: DateTime<Utc>,
    ) -> Result<LearnerWordState>;

    /// Overwrite a record with the given state
    fn update(&self, state: &LearnerWordState) -> Result<()>;

    /// Read, transform and write one record as a single atomic step.
    ///
    /// Concurrent calls for the same pair are serialized, so `apply` always
    /// sees the state written by the previous call.
    fn update_with(
        &self,
        learner: LearnerId,
        word: WordId,
        apply: &mut dyn FnMut(&LearnerWordState) -> LearnerWordState,
    ) -> Result<LearnerWordState>;

    /// Records with `next_review <= timestamp`, earliest first, ties by word id
    fn due_before(&self, learner: LearnerId, timestamp: DateTime<Utc>) -> Result<Vec<LearnerWordState>>;

    fn all_for(&self, learner: LearnerId) -> Result<Vec<LearnerWordState>>;
}

/// Per-learner quota configuration and running totals
pub trait ProfileStore: Send + Sync {
    fn get_or_create(&self, learner: LearnerId) -> Result<LearnerProfile>;

    fn save(&self, profile: &LearnerProfile) -> Result<()>;

    /// Atomic read-modify-write of a profile, creating it first if needed
    fn update_profile_with(
        &self,
        learner: LearnerId,
        apply: &mut dyn FnMut(&mut LearnerProfile),
    ) -> Result<LearnerProfile>;
}
