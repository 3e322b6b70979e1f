use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use super::flashcard::{Card, CardRating, FlashcardSession, FlashcardView};
use super::quiz::{AnswerFeedback, QuizQuestion, QuizSession, QUIZ_CORRECT_QUALITY};
use super::registry::{Session, SessionRegistry};
use crate::scheduler::{Result, Scheduler, SchedulerError};
use crate::srs::LearnerId;

/// Runs quiz and flashcard sessions on top of a scheduler
pub struct Trainer {
    scheduler: Arc<Scheduler>,
    sessions: SessionRegistry,
    rng: Mutex<StdRng>,
}

impl Trainer {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self {
            scheduler,
            sessions: SessionRegistry::new(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic question and deck order
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    // ==== Quiz ====

    /// Start a quiz over the whole vocabulary and return its first question
    pub fn start_quiz(&self, learner: LearnerId) -> Result<(Uuid, QuizQuestion)> {
        let pool = self.scheduler.vocabulary().all_words()?;
        let limit = self.scheduler.config().quiz_length;

        let quiz = QuizSession::start(learner, pool, Some(limit), &mut self.fork_rng())?;
        let question = quiz
            .current_question()
            .cloned()
            .ok_or(SchedulerError::InvalidTransition {
                state: quiz.state().name(),
                action: "start",
            })?;
        let id = self.sessions.insert(Session::Quiz(quiz));
        Ok((id, question))
    }

    /// Grade an answer. A correct answer tracks the featured word if needed
    /// and records it with quality 4 before the quiz moves on.
    pub fn answer_quiz(&self, id: Uuid, answer: &str) -> Result<AnswerFeedback> {
        let scheduler = &self.scheduler;
        self.sessions.with_quiz(id, |quiz| {
            let learner = quiz.learner();
            let mut rng = self.fork_rng();
            quiz.answer(answer, &mut rng, |word| {
                scheduler.track_word(learner, word)?;
                scheduler.record_answer(learner, word, QUIZ_CORRECT_QUALITY)?;
                Ok(())
            })
        })
    }

    pub fn cancel_quiz(&self, id: Uuid) -> Result<()> {
        self.sessions.with_quiz(id, |quiz| quiz.cancel())
    }

    // ==== Flashcards ====

    /// Start a flashcard session over the learner's due words, or over a
    /// random sample of the vocabulary when nothing is due.
    pub fn start_flashcards(&self, learner: LearnerId) -> Result<(Uuid, FlashcardView)> {
        let deck_size = self.scheduler.config().flashcard_deck_size;
        let mut rng = self.fork_rng();

        let due = self.scheduler.select_due(learner, Some(deck_size), &mut rng)?;
        let mut cards: Vec<Card> = self
            .scheduler
            .with_words(due)?
            .iter()
            .map(|entry| Card::from(&entry.word))
            .collect();

        if cards.is_empty() {
            let vocabulary = self.scheduler.vocabulary().all_words()?;
            cards = vocabulary
                .choose_multiple(&mut rng, deck_size)
                .map(Card::from)
                .collect();
            log::debug!("Nothing due for learner {}, sampled {} cards", learner, cards.len());
        }

        if cards.is_empty() {
            return Err(SchedulerError::InsufficientData {
                needed: 1,
                available: 0,
            });
        }

        let session = FlashcardSession::start(learner, cards);
        let view = session.view();
        let id = self.sessions.insert(Session::Flashcards(session));
        Ok((id, view))
    }

    pub fn reveal_card(&self, id: Uuid) -> Result<FlashcardView> {
        self.sessions.with_flashcards(id, |cards| cards.reveal())
    }

    pub fn rate_card(&self, id: Uuid, rating: CardRating) -> Result<FlashcardView> {
        self.sessions.with_flashcards(id, |cards| cards.rate(rating))
    }

    pub fn skip_card(&self, id: Uuid) -> Result<FlashcardView> {
        self.sessions.with_flashcards(id, |cards| cards.skip())
    }

    pub fn cancel_flashcards(&self, id: Uuid) -> Result<()> {
        self.sessions.with_flashcards(id, |cards| cards.cancel())
    }

    /// Private generator seeded from the shared one. The shared lock is
    /// released before any store access.
    fn fork_rng(&self) -> StdRng {
        let seed: u64 = self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen();
        StdRng::seed_from_u64(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{OnceLock, Weak};

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::clock::FixedClock;
    use crate::config::EngineConfig;
    use crate::session::{QuizStep, QuizVerdict};
    use crate::srs::LearnerWordState;
    use crate::storage::{MemoryStore, ProgressStore, Result as StoreResult, VocabularyStore};
    use crate::vocab::{NewWord, WordId};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    fn setup(words: usize, config: EngineConfig) -> (Trainer, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for i in 0..words {
            store
                .add_word(NewWord::new(format!("word{}", i), format!("перевод{}", i)))
                .unwrap();
        }
        let scheduler = Scheduler::from_store(store.clone(), config)
            .with_clock(Arc::new(FixedClock::new(start())));
        (Trainer::new(Arc::new(scheduler)).with_seed(17), store)
    }

    #[test]
    fn test_quiz_correct_answer_tracks_and_schedules() {
        let (trainer, store) = setup(6, EngineConfig::default());
        let (id, question) = trainer.start_quiz(1).unwrap();
        assert!(store.get(1, question.word_id).unwrap().is_none());

        let feedback = trainer.answer_quiz(id, &question.correct_answer).unwrap();
        assert!(feedback.correct);

        let state = store.get(1, question.word_id).unwrap().unwrap();
        assert_eq!(state.repetition, 1);
        assert_eq!(state.correct_answers, 1);
        assert_eq!(state.next_review, start() + Duration::days(1));
        assert_eq!(trainer.scheduler().profile(1).unwrap().total_reviews, 1);
    }

    #[test]
    fn test_quiz_wrong_answer_changes_nothing() {
        let (trainer, store) = setup(6, EngineConfig::default());
        let (id, _question) = trainer.start_quiz(1).unwrap();

        let feedback = trainer.answer_quiz(id, "no such answer").unwrap();
        assert!(!feedback.correct);
        assert!(store.all_for(1).unwrap().is_empty());
    }

    #[test]
    fn test_quiz_runs_to_summary() {
        let config = EngineConfig {
            quiz_length: 3,
            ..EngineConfig::default()
        };
        let (trainer, _store) = setup(8, config);
        let (id, mut question) = trainer.start_quiz(1).unwrap();

        let summary = loop {
            let feedback = trainer.answer_quiz(id, &question.correct_answer).unwrap();
            match feedback.next {
                QuizStep::Question(next) => question = next,
                QuizStep::Finished(summary) => break summary,
            }
        };
        assert_eq!(summary.total_questions, 3);
        assert_eq!(summary.score, 3);
        assert_eq!(summary.verdict, QuizVerdict::Excellent);
        assert!(matches!(
            trainer.answer_quiz(id, "late"),
            Err(SchedulerError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_quiz_needs_four_words() {
        let (trainer, _store) = setup(3, EngineConfig::default());
        assert!(matches!(
            trainer.start_quiz(1),
            Err(SchedulerError::InsufficientData { needed: 4, available: 3 })
        ));
    }

    #[test]
    fn test_flashcards_use_due_words_first() {
        let (trainer, store) = setup(10, EngineConfig::default());
        trainer.scheduler().configure_profile(1, None, Some(0)).unwrap();
        store.create(1, 4, start() - Duration::hours(1)).unwrap();
        store.create(1, 9, start() - Duration::hours(2)).unwrap();

        let (id, view) = trainer.start_flashcards(1).unwrap();
        match view {
            FlashcardView::Front(front) => {
                assert_eq!(front.word_id, 9);
                assert_eq!(front.total, 2);
            }
            other => panic!("expected front, got {:?}", other),
        }

        trainer.reveal_card(id).unwrap();
        trainer.rate_card(id, CardRating::Easy).unwrap();
        match trainer.skip_card(id).unwrap() {
            FlashcardView::Complete(summary) => {
                assert_eq!(summary.cards_viewed, 2);
                assert_eq!(summary.revealed, 1);
            }
            other => panic!("expected summary, got {:?}", other),
        }
        // Ratings never touch the schedule
        assert_eq!(store.get(1, 9).unwrap().unwrap().repetition, 0);
    }

    #[test]
    fn test_flashcards_fall_back_to_vocabulary_sample() {
        let config = EngineConfig {
            flashcard_deck_size: 3,
            ..EngineConfig::default()
        };
        let (trainer, store) = setup(5, config);
        trainer.scheduler().configure_profile(1, None, Some(0)).unwrap();

        let (id, view) = trainer.start_flashcards(1).unwrap();
        assert!(matches!(view, FlashcardView::Front(ref front) if front.total == 3));
        assert!(store.all_for(1).unwrap().is_empty());

        trainer.cancel_flashcards(id).unwrap();
        assert!(trainer.sessions().is_empty());
    }

    #[test]
    fn test_flashcards_without_vocabulary() {
        let (trainer, _store) = setup(0, EngineConfig::default());
        assert!(matches!(
            trainer.start_flashcards(1),
            Err(SchedulerError::InsufficientData { .. })
        ));
    }

    /// Progress store that checks the trainer's shared generator is free
    /// whenever the scheduler reaches it.
    struct RngWatchStore {
        inner: Arc<MemoryStore>,
        trainer: OnceLock<Weak<Trainer>>,
        checked: AtomicBool,
        rng_held: AtomicBool,
    }

    impl RngWatchStore {
        fn check(&self) {
            if let Some(trainer) = self.trainer.get().and_then(Weak::upgrade) {
                self.checked.store(true, Ordering::SeqCst);
                if trainer.rng.try_lock().is_err() {
                    self.rng_held.store(true, Ordering::SeqCst);
                }
            }
        }
    }

    impl ProgressStore for RngWatchStore {
        fn get(&self, learner: LearnerId, word: WordId) -> StoreResult<Option<LearnerWordState>> {
            self.check();
            self.inner.get(learner, word)
        }

        fn create(
            &self,
            learner: LearnerId,
            word: WordId,
            next_review: DateTime<Utc>,
        ) -> StoreResult<LearnerWordState> {
            self.check();
            self.inner.create(learner, word, next_review)
        }

        fn update(&self, state: &LearnerWordState) -> StoreResult<()> {
            self.inner.update(state)
        }

        fn update_with(
            &self,
            learner: LearnerId,
            word: WordId,
            apply: &mut dyn FnMut(&LearnerWordState) -> LearnerWordState,
        ) -> StoreResult<LearnerWordState> {
            self.check();
            self.inner.update_with(learner, word, apply)
        }

        fn due_before(
            &self,
            learner: LearnerId,
            timestamp: DateTime<Utc>,
        ) -> StoreResult<Vec<LearnerWordState>> {
            self.check();
            self.inner.due_before(learner, timestamp)
        }

        fn all_for(&self, learner: LearnerId) -> StoreResult<Vec<LearnerWordState>> {
            self.inner.all_for(learner)
        }
    }

    #[test]
    fn test_store_calls_run_without_shared_rng_lock() {
        let inner = Arc::new(MemoryStore::new());
        for i in 0..6 {
            inner
                .add_word(NewWord::new(format!("word{}", i), format!("перевод{}", i)))
                .unwrap();
        }
        let watch = Arc::new(RngWatchStore {
            inner: inner.clone(),
            trainer: OnceLock::new(),
            checked: AtomicBool::new(false),
            rng_held: AtomicBool::new(false),
        });
        let scheduler = Scheduler::new(inner.clone(), watch.clone(), inner.clone(), EngineConfig::default())
            .with_clock(Arc::new(FixedClock::new(start())));
        let trainer = Arc::new(Trainer::new(Arc::new(scheduler)).with_seed(5));
        watch.trainer.set(Arc::downgrade(&trainer)).unwrap();

        let (id, question) = trainer.start_quiz(1).unwrap();
        assert!(trainer.answer_quiz(id, &question.correct_answer).unwrap().correct);
        trainer.start_flashcards(1).unwrap();

        assert!(watch.checked.load(Ordering::SeqCst));
        assert!(!watch.rng_held.load(Ordering::SeqCst));
    }

    #[test]
    fn test_session_kinds_are_checked() {
        let (trainer, _store) = setup(6, EngineConfig::default());
        let (quiz_id, _) = trainer.start_quiz(1).unwrap();

        assert!(matches!(
            trainer.reveal_card(quiz_id),
            Err(SchedulerError::SessionKindMismatch { .. })
        ));
        trainer.cancel_quiz(quiz_id).unwrap();
        assert!(matches!(
            trainer.cancel_quiz(quiz_id),
            Err(SchedulerError::SessionNotFound(_))
        ));
    }
}
