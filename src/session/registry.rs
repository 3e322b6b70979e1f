use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use super::flashcard::FlashcardSession;
use super::quiz::QuizSession;
use crate::scheduler::{Result, SchedulerError};
use crate::srs::LearnerId;

#[derive(Debug)]
pub enum Session {
    Quiz(QuizSession),
    Flashcards(FlashcardSession),
}

impl Session {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Quiz(quiz) => quiz.id(),
            Self::Flashcards(cards) => cards.id(),
        }
    }

    pub fn learner(&self) -> LearnerId {
        match self {
            Self::Quiz(quiz) => quiz.learner(),
            Self::Flashcards(cards) => cards.learner(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Quiz(_) => "quiz",
            Self::Flashcards(_) => "flashcards",
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            Self::Quiz(quiz) => quiz.is_terminal(),
            Self::Flashcards(cards) => cards.is_terminal(),
        }
    }
}

/// Live sessions keyed by id.
///
/// Each session sits behind its own lock, so different learners never wait
/// on each other. Sessions are dropped as soon as they reach a terminal
/// state.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) -> Uuid {
        let id = session.id();
        self.lock().insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Ids of the live sessions belonging to a learner
    pub fn sessions_for(&self, learner: LearnerId) -> Vec<Uuid> {
        let handles: Vec<_> = self.lock().values().cloned().collect();
        handles
            .iter()
            .filter_map(|handle| {
                let session = handle.lock().unwrap_or_else(PoisonError::into_inner);
                (session.learner() == learner).then(|| session.id())
            })
            .collect()
    }

    pub fn with_quiz<T>(&self, id: Uuid, f: impl FnOnce(&mut QuizSession) -> Result<T>) -> Result<T> {
        self.with_session(id, |session| match session {
            Session::Quiz(quiz) => f(quiz),
            other => Err(SchedulerError::SessionKindMismatch {
                id,
                expected: "quiz",
                found: other.kind(),
            }),
        })
    }

    pub fn with_flashcards<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut FlashcardSession) -> Result<T>,
    ) -> Result<T> {
        self.with_session(id, |session| match session {
            Session::Flashcards(cards) => f(cards),
            other => Err(SchedulerError::SessionKindMismatch {
                id,
                expected: "flashcards",
                found: other.kind(),
            }),
        })
    }

    /// Cancel and drop a live session
    pub fn cancel(&self, id: Uuid) -> Result<()> {
        self.with_session(id, |session| match session {
            Session::Quiz(quiz) => quiz.cancel(),
            Session::Flashcards(cards) => cards.cancel(),
        })
    }

    fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> Result<T>) -> Result<T> {
        let handle = self
            .lock()
            .get(&id)
            .cloned()
            .ok_or(SchedulerError::SessionNotFound(id))?;

        let mut session = handle.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut session);
        let finished = session.is_terminal();
        drop(session);

        if finished && self.lock().remove(&id).is_some() {
            log::debug!("Session {} closed", id);
        }
        result
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<Mutex<Session>>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
