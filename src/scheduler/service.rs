use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Result, SchedulerError};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::srs::algorithm;
use crate::srs::{LearnerId, LearnerProfile, LearnerStats, LearnerWordState, Quality};
use crate::storage::{ProfileStore, ProgressStore, VocabularyStore};
use crate::vocab::{Word, WordId};

/// A scheduling record joined with its vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordWithState {
    pub word: Word,
    pub state: LearnerWordState,
}

/// Entry point for scheduling decisions.
///
/// Holds no per-learner state of its own, so one instance can serve many
/// learners from many threads.
pub struct Scheduler {
    pub(super) vocabulary: Arc<dyn VocabularyStore>,
    pub(super) progress: Arc<dyn ProgressStore>,
    pub(super) profiles: Arc<dyn ProfileStore>,
    pub(super) clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl Scheduler {
    pub fn new(
        vocabulary: Arc<dyn VocabularyStore>,
        progress: Arc<dyn ProgressStore>,
        profiles: Arc<dyn ProfileStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            vocabulary,
            progress,
            profiles,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Build from a single store that serves all three roles
    pub fn from_store<S>(store: Arc<S>, config: EngineConfig) -> Self
    where
        S: VocabularyStore + ProgressStore + ProfileStore + 'static,
    {
        Self::new(store.clone(), store.clone(), store, config)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn vocabulary(&self) -> &dyn VocabularyStore {
        self.vocabulary.as_ref()
    }

    pub fn progress(&self) -> &dyn ProgressStore {
        self.progress.as_ref()
    }

    pub fn profile(&self, learner: LearnerId) -> Result<LearnerProfile> {
        Ok(self.profiles.get_or_create(learner)?)
    }

    /// Change a learner's daily quotas
    pub fn configure_profile(
        &self,
        learner: LearnerId,
        daily_review_limit: Option<u32>,
        daily_new_words: Option<u32>,
    ) -> Result<LearnerProfile> {
        let profile = self.profiles.update_profile_with(learner, &mut |profile| {
            if let Some(limit) = daily_review_limit {
                profile.daily_review_limit = limit;
            }
            if let Some(new_words) = daily_new_words {
                profile.daily_new_words = new_words;
            }
        })?;
        Ok(profile)
    }

    /// Start tracking a word for a learner (explicit add)
    pub fn track_word(&self, learner: LearnerId, word: WordId) -> Result<LearnerWordState> {
        if self.vocabulary.get_word(word)?.is_none() {
            return Err(SchedulerError::UnknownWord(word));
        }
        Ok(self.progress.create(learner, word, self.clock.now())?)
    }

    /// Apply an answer to the stored state and update the learner's totals.
    ///
    /// The quality is validated before anything is read. The SM-2 step runs
    /// inside the store's atomic update, so concurrent answers for the same
    /// pair never overwrite each other with stale values. The learned total
    /// moves by the threshold crossing observed inside that update, so
    /// answers for different words commute.
    pub fn record_answer(
        &self,
        learner: LearnerId,
        word: WordId,
        quality: i32,
    ) -> Result<LearnerWordState> {
        let quality = Quality::new(quality)?;
        let now = self.clock.now();

        let mut previous_repetition = 0;
        let state = self.progress.update_with(learner, word, &mut |current| {
            previous_repetition = current.repetition;
            algorithm::apply(current, quality, now)
        })?;

        let threshold = self.config.learned_threshold;
        let was_learned = previous_repetition >= threshold;
        let is_learned = state.repetition >= threshold;

        self.profiles.update_profile_with(learner, &mut |profile| {
            profile.total_reviews += 1;
            match (was_learned, is_learned) {
                (false, true) => profile.total_words_learned += 1,
                (true, false) => {
                    profile.total_words_learned = profile.total_words_learned.saturating_sub(1)
                }
                _ => {}
            }
            profile.register_review_day(now.date_naive());
        })?;

        Ok(state)
    }

    /// Progress summary. Counting today's words runs a regular due
    /// selection, so it may track new words just like a session would.
    pub fn statistics<R: Rng + ?Sized>(&self, learner: LearnerId, rng: &mut R) -> Result<LearnerStats> {
        let states = self.progress.all_for(learner)?;
        let threshold = self.config.learned_threshold;

        let mut stats = LearnerStats {
            total_words: states.len(),
            ..Default::default()
        };
        for state in &states {
            match state.repetition {
                0 => stats.new_words += 1,
                r if r >= threshold => stats.learned_words += 1,
                _ => stats.learning_words += 1,
            }
        }

        stats.today_words = self.select_due(learner, None, rng)?.len();

        let profile = self.profiles.get_or_create(learner)?;
        stats.total_reviews = profile.total_reviews;
        stats.streak_days = profile.streak_days;
        Ok(stats)
    }

    /// Attach vocabulary entries to scheduling records, keeping their order.
    /// Records whose word has disappeared are skipped.
    pub fn with_words(&self, states: Vec<LearnerWordState>) -> Result<Vec<WordWithState>> {
        let mut joined = Vec::with_capacity(states.len());
        for state in states {
            match self.vocabulary.get_word(state.word_id)? {
                Some(word) => joined.push(WordWithState { word, state }),
                None => log::warn!("Word {} missing from vocabulary, skipped", state.word_id),
            }
        }
        Ok(joined)
    }
}
