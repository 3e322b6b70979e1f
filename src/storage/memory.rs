//! In-process store backed by mutex-guarded maps

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::error::{Result, StoreError};
use super::traits::{ProfileStore, ProgressStore, VocabularyStore};
use crate::srs::{
    LearnerId, LearnerProfile, LearnerWordState, DEFAULT_DAILY_NEW_WORDS,
    DEFAULT_DAILY_REVIEW_LIMIT,
};
use crate::vocab::{NewWord, Word, WordId};

#[derive(Default)]
struct Vocabulary {
    words: BTreeMap<WordId, Word>,
    next_id: WordId,
}

/// Store holding vocabulary, progress and profiles in memory.
///
/// Every map has its own lock; read-modify-write operations hold the lock
/// for the whole step.
pub struct MemoryStore {
    vocabulary: Mutex<Vocabulary>,
    progress: Mutex<HashMap<(LearnerId, WordId), LearnerWordState>>,
    profiles: Mutex<HashMap<LearnerId, LearnerProfile>>,
    default_review_limit: u32,
    default_new_words: u32,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            vocabulary: Mutex::new(Vocabulary::default()),
            progress: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
            default_review_limit: DEFAULT_DAILY_REVIEW_LIMIT,
            default_new_words: DEFAULT_DAILY_NEW_WORDS,
        }
    }

    /// Limits used when a profile is created on first access
    pub fn with_profile_defaults(mut self, daily_review_limit: u32, daily_new_words: u32) -> Self {
        self.default_review_limit = daily_review_limit;
        self.default_new_words = daily_new_words;
        self
    }

    fn vocabulary(&self) -> Result<MutexGuard<'_, Vocabulary>> {
        self.vocabulary.lock().map_err(|_| StoreError::Poisoned)
    }

    fn progress(&self) -> Result<MutexGuard<'_, HashMap<(LearnerId, WordId), LearnerWordState>>> {
        self.progress.lock().map_err(|_| StoreError::Poisoned)
    }

    fn profiles(&self) -> Result<MutexGuard<'_, HashMap<LearnerId, LearnerProfile>>> {
        self.profiles.lock().map_err(|_| StoreError::Poisoned)
    }

    fn new_profile(&self, learner: LearnerId) -> LearnerProfile {
        LearnerProfile::with_limits(learner, self.default_review_limit, self.default_new_words)
    }
}

impl VocabularyStore for MemoryStore {
    fn all_words(&self) -> Result<Vec<Word>> {
        Ok(self.vocabulary()?.words.values().cloned().collect())
    }

    fn words_excluding(&self, excluded: &[WordId]) -> Result<Vec<Word>> {
        let excluded: HashSet<WordId> = excluded.iter().copied().collect();
        Ok(self
            .vocabulary()?
            .words
            .values()
            .filter(|w| !excluded.contains(&w.id))
            .cloned()
            .collect())
    }

    fn get_word(&self, id: WordId) -> Result<Option<Word>> {
        Ok(self.vocabulary()?.words.get(&id).cloned())
    }

    fn add_word(&self, word: NewWord) -> Result<Word> {
        let mut vocabulary = self.vocabulary()?;
        vocabulary.next_id += 1;
        let word = word.into_word(vocabulary.next_id, Utc::now());
        vocabulary.words.insert(word.id, word.clone());
        Ok(word)
    }
}

impl ProgressStore for MemoryStore {
    fn get(&self, learner: LearnerId, word: WordId) -> Result<Option<LearnerWordState>> {
        Ok(self.progress()?.get(&(learner, word)).cloned())
    }

    fn create(
        &self,
        learner: LearnerId,
        word: WordId,
        next_review: DateTime<Utc>,
    ) -> Result<LearnerWordState> {
        let mut progress = self.progress()?;
        let state = progress
            .entry((learner, word))
            .or_insert_with(|| LearnerWordState::new(learner, word, next_review));
        Ok(state.clone())
    }

    fn update(&self, state: &LearnerWordState) -> Result<()> {
        let mut progress = self.progress()?;
        match progress.get_mut(&(state.learner_id, state.word_id)) {
            Some(existing) => {
                *existing = state.clone();
                Ok(())
            }
            None => Err(StoreError::ProgressNotFound {
                learner: state.learner_id,
                word: state.word_id,
            }),
        }
    }

    fn update_with(
        &self,
        learner: LearnerId,
        word: WordId,
        apply: &mut dyn FnMut(&LearnerWordState) -> LearnerWordState,
    ) -> Result<LearnerWordState> {
        let mut progress = self.progress()?;
        let existing = progress
            .get_mut(&(learner, word))
            .ok_or(StoreError::ProgressNotFound { learner, word })?;
        let next = apply(existing);
        *existing = next.clone();
        Ok(next)
    }

    fn due_before(&self, learner: LearnerId, timestamp: DateTime<Utc>) -> Result<Vec<LearnerWordState>> {
        let mut due: Vec<LearnerWordState> = self
            .progress()?
            .values()
            .filter(|s| s.learner_id == learner && s.next_review <= timestamp)
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            a.next_review
                .cmp(&b.next_review)
                .then(a.word_id.cmp(&b.word_id))
        });
        Ok(due)
    }

    fn all_for(&self, learner: LearnerId) -> Result<Vec<LearnerWordState>> {
        let mut states: Vec<LearnerWordState> = self
            .progress()?
            .values()
            .filter(|s| s.learner_id == learner)
            .cloned()
            .collect();
        states.sort_by_key(|s| s.word_id);
        Ok(states)
    }
}

impl ProfileStore for MemoryStore {
    fn get_or_create(&self, learner: LearnerId) -> Result<LearnerProfile> {
        let mut profiles = self.profiles()?;
        let profile = profiles
            .entry(learner)
            .or_insert_with(|| self.new_profile(learner));
        Ok(profile.clone())
    }

    fn save(&self, profile: &LearnerProfile) -> Result<()> {
        self.profiles()?.insert(profile.learner_id, profile.clone());
        Ok(())
    }

    fn update_profile_with(
        &self,
        learner: LearnerId,
        apply: &mut dyn FnMut(&mut LearnerProfile),
    ) -> Result<LearnerProfile> {
        let mut profiles = self.profiles()?;
        let profile = profiles
            .entry(learner)
            .or_insert_with(|| self.new_profile(learner));
        apply(profile);
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_with_words(count: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..count {
            store
                .add_word(NewWord::new(format!("word{}", i), format!("слово{}", i)))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_add_and_list_words() {
        let store = store_with_words(3);
        let words = store.all_words().unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let rest = store.words_excluding(&[2]).unwrap();
        assert_eq!(rest.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_create_is_get_or_create() {
        let store = store_with_words(1);
        let now = Utc::now();

        let first = store.create(1, 1, now).unwrap();
        let mut changed = first.clone();
        changed.repetition = 3;
        store.update(&changed).unwrap();

        let second = store.create(1, 1, now + Duration::days(1)).unwrap();
        assert_eq!(second.repetition, 3);
        assert_eq!(second.next_review, now);
        assert_eq!(store.all_for(1).unwrap().len(), 1);
    }

    #[test]
    fn test_due_before_orders_by_next_review() {
        let store = store_with_words(3);
        let now = Utc::now();
        store.create(1, 1, now - Duration::hours(1)).unwrap();
        store.create(1, 2, now - Duration::hours(3)).unwrap();
        store.create(1, 3, now + Duration::hours(1)).unwrap();
        store.create(2, 1, now - Duration::hours(5)).unwrap();

        let due = store.due_before(1, now).unwrap();
        assert_eq!(due.iter().map(|s| s.word_id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_update_with_missing_record() {
        let store = store_with_words(1);
        let result = store.update_with(1, 1, &mut |s| s.clone());
        assert!(matches!(
            result,
            Err(StoreError::ProgressNotFound { learner: 1, word: 1 })
        ));
    }

    #[test]
    fn test_profile_defaults_and_update() {
        let store = MemoryStore::new().with_profile_defaults(8, 2);
        let profile = store.get_or_create(4).unwrap();
        assert_eq!(profile.daily_review_limit, 8);
        assert_eq!(profile.daily_new_words, 2);

        let updated = store
            .update_profile_with(4, &mut |p| p.total_reviews += 1)
            .unwrap();
        assert_eq!(updated.total_reviews, 1);
        assert_eq!(store.get_or_create(4).unwrap().total_reviews, 1);
    }

    #[test]
    fn test_save_overwrites_profile() {
        let store = MemoryStore::new();
        let mut profile = store.get_or_create(6).unwrap();
        profile.daily_new_words = 0;
        profile.streak_days = 3;
        store.save(&profile).unwrap();

        assert_eq!(store.get_or_create(6).unwrap(), profile);
    }
}
