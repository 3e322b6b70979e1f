//! Due-word selection under daily quotas, and word pools for pairing games

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use super::error::{Result, SchedulerError};
use super::Scheduler;
use crate::srs::{LearnerId, LearnerWordState};
use crate::vocab::WordId;

/// Due-selection limit used when building a game pool
pub const GAME_DUE_LIMIT: usize = 20;

/// Largest pool handed to a pairing game
pub const GAME_POOL_CAP: usize = 12;

impl Scheduler {
    /// Words the learner should study now.
    ///
    /// Due records come first, earliest `next_review` first. When fewer than
    /// `limit` are due, unseen vocabulary is sampled (at most
    /// `daily_new_words`) and tracked with `next_review = now`, which makes a
    /// repeated call see those words as due instead of injecting more.
    pub fn select_due<R: Rng + ?Sized>(
        &self,
        learner: LearnerId,
        limit: Option<usize>,
        rng: &mut R,
    ) -> Result<Vec<LearnerWordState>> {
        let profile = self.profiles.get_or_create(learner)?;
        let limit = limit.unwrap_or(profile.daily_review_limit as usize);
        let now = self.clock.now();

        let mut selected = self.progress.due_before(learner, now)?;
        let due_count = selected.len();

        if due_count < limit && profile.daily_new_words > 0 {
            let tracked: Vec<WordId> = self
                .progress
                .all_for(learner)?
                .iter()
                .map(|s| s.word_id)
                .collect();
            let candidates = self.vocabulary.words_excluding(&tracked)?;
            let take = candidates
                .len()
                .min(profile.daily_new_words as usize)
                .min(limit - due_count);

            for word in candidates.choose_multiple(rng, take) {
                let state = self.progress.create(learner, word.id, now)?;
                if selected.iter().all(|s| s.word_id != state.word_id) {
                    selected.push(state);
                }
            }

            log::debug!(
                "Learner {}: {} due, injected {} new of {} unseen",
                learner,
                due_count,
                selected.len() - due_count,
                candidates.len()
            );
        }

        selected.truncate(limit);
        Ok(selected)
    }

    /// Deduplicated pool of at most 12 words for matching exercises.
    ///
    /// Starts from the due selection and, when that holds fewer than
    /// `min_words`, tops up from the learner's shuffled history until
    /// `2 * min_words` words are collected.
    pub fn select_pool<R: Rng + ?Sized>(
        &self,
        learner: LearnerId,
        min_words: usize,
        rng: &mut R,
    ) -> Result<Vec<LearnerWordState>> {
        let mut pool = self.select_due(learner, Some(GAME_DUE_LIMIT), rng)?;
        let scheduled = pool.len();

        if pool.len() < min_words {
            let mut history = self.progress.all_for(learner)?;
            history.shuffle(rng);

            for state in history {
                if pool.len() >= min_words * 2 {
                    break;
                }
                if pool.iter().all(|s| s.word_id != state.word_id) {
                    pool.push(state);
                }
            }
        }

        let mut seen = HashSet::new();
        pool.retain(|s| seen.insert(s.word_id));
        pool.truncate(GAME_POOL_CAP);

        log::debug!(
            "Game pool for learner {}: {} scheduled, {} total",
            learner,
            scheduled,
            pool.len()
        );

        let needed = min_words.min(GAME_POOL_CAP);
        if pool.len() < needed {
            return Err(SchedulerError::InsufficientData {
                needed,
                available: pool.len(),
            });
        }

        Ok(pool)
    }
}
