//! Multiple-choice quiz session
//!
//! A session is created already holding its first question and loops in
//! `AwaitingAnswer` until the question budget is spent or no further
//! question can be built, then becomes `Finished`. `Cancelled` discards
//! the score.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduler::{Result, SchedulerError};
use crate::srs::LearnerId;
use crate::vocab::{Word, WordId};

/// Options shown per question
pub const QUIZ_OPTION_COUNT: usize = 4;

/// SM-2 quality recorded for a correctly answered question
pub const QUIZ_CORRECT_QUALITY: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionDirection {
    /// Show the foreign word, pick its translation
    OriginalToTranslation,
    /// Show the translation, pick the foreign word
    TranslationToOriginal,
}

impl QuestionDirection {
    fn prompt<'a>(&self, word: &'a Word) -> &'a str {
        match self {
            Self::OriginalToTranslation => &word.original,
            Self::TranslationToOriginal => &word.translation,
        }
    }

    fn answer<'a>(&self, word: &'a Word) -> &'a str {
        match self {
            Self::OriginalToTranslation => &word.translation,
            Self::TranslationToOriginal => &word.original,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub word_id: WordId,
    pub direction: QuestionDirection,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizQuestion {
    /// Exact text comparison with the stored answer
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

/// Build a question from four distinct words of the pool.
///
/// Words repeating the id, original or translation of an earlier pool
/// entry are skipped, so every option text is unique in either direction.
/// Fails with `InsufficientData` when fewer than four words remain.
pub fn next_question<R: Rng + ?Sized>(pool: &[Word], rng: &mut R) -> Result<QuizQuestion> {
    let distinct = distinct_words(pool);
    if distinct.len() < QUIZ_OPTION_COUNT {
        return Err(SchedulerError::InsufficientData {
            needed: QUIZ_OPTION_COUNT,
            available: distinct.len(),
        });
    }

    let picked: Vec<&Word> = distinct
        .choose_multiple(rng, QUIZ_OPTION_COUNT)
        .copied()
        .collect();

    let direction = if rng.gen_bool(0.5) {
        QuestionDirection::OriginalToTranslation
    } else {
        QuestionDirection::TranslationToOriginal
    };
    let featured = picked[rng.gen_range(0..picked.len())];

    let mut options: Vec<String> = picked
        .iter()
        .map(|w| direction.answer(w).to_string())
        .collect();
    options.shuffle(rng);

    Ok(QuizQuestion {
        word_id: featured.id,
        direction,
        prompt: direction.prompt(featured).to_string(),
        transcription: match direction {
            QuestionDirection::OriginalToTranslation => featured.transcription.clone(),
            QuestionDirection::TranslationToOriginal => None,
        },
        options,
        correct_answer: direction.answer(featured).to_string(),
    })
}

fn distinct_words(pool: &[Word]) -> Vec<&Word> {
    let mut ids = HashSet::new();
    let mut texts: HashSet<&str> = HashSet::new();
    pool.iter()
        .filter(|w| {
            if ids.contains(&w.id)
                || texts.contains(w.original.as_str())
                || texts.contains(w.translation.as_str())
            {
                return false;
            }
            ids.insert(w.id);
            texts.insert(&w.original);
            texts.insert(&w.translation);
            true
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizVerdict {
    Excellent,
    Good,
    KeepPracticing,
}

impl QuizVerdict {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Self::Excellent
        } else if percentage >= 60.0 {
            Self::Good
        } else {
            Self::KeepPracticing
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: f64,
    pub verdict: QuizVerdict,
}

impl QuizSummary {
    fn new(score: u32, total_questions: u32) -> Self {
        let percentage = if total_questions == 0 {
            0.0
        } else {
            score as f64 * 100.0 / total_questions as f64
        };
        Self {
            score,
            total_questions,
            percentage,
            verdict: QuizVerdict::from_percentage(percentage),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizState {
    AwaitingAnswer { question: QuizQuestion },
    Finished { summary: QuizSummary },
    Cancelled,
}

impl QuizState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AwaitingAnswer { .. } => "awaiting an answer",
            Self::Finished { .. } => "finished",
            Self::Cancelled => "cancelled",
        }
    }
}

/// What follows an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuizStep {
    Question(QuizQuestion),
    Finished(QuizSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub correct: bool,
    pub correct_answer: String,
    pub score: u32,
    pub next: QuizStep,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    learner: LearnerId,
    pool: Vec<Word>,
    question_limit: Option<usize>,
    score: u32,
    total_questions: u32,
    state: QuizState,
}

impl QuizSession {
    /// Start a quiz over `pool`, generating the first question.
    ///
    /// `question_limit` caps the number of answers; `None` keeps asking for
    /// as long as questions can be built.
    pub fn start<R: Rng + ?Sized>(
        learner: LearnerId,
        pool: Vec<Word>,
        question_limit: Option<usize>,
        rng: &mut R,
    ) -> Result<Self> {
        let question = next_question(&pool, rng)?;
        let session = Self {
            id: Uuid::new_v4(),
            learner,
            pool,
            question_limit,
            score: 0,
            total_questions: 0,
            state: QuizState::AwaitingAnswer { question },
        };
        log::info!("Quiz {} started for learner {}", session.id, learner);
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn learner(&self) -> LearnerId {
        self.learner
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match &self.state {
            QuizState::AwaitingAnswer { question } => Some(question),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, QuizState::AwaitingAnswer { .. })
    }

    /// Grade an answer and move to the next question or the summary.
    ///
    /// `on_correct` receives the featured word of a correctly answered
    /// question and runs before the session changes; if it fails, the
    /// session is left exactly as it was. Wrong answers never call it.
    pub fn answer<R, F>(&mut self, answer: &str, rng: &mut R, on_correct: F) -> Result<AnswerFeedback>
    where
        R: Rng + ?Sized,
        F: FnOnce(WordId) -> Result<()>,
    {
        let question = match &self.state {
            QuizState::AwaitingAnswer { question } => question,
            other => {
                return Err(SchedulerError::InvalidTransition {
                    state: other.name(),
                    action: "answer",
                })
            }
        };

        let correct = question.is_correct(answer);
        let correct_answer = question.correct_answer.clone();
        if correct {
            on_correct(question.word_id)?;
            self.score += 1;
        }
        self.total_questions += 1;

        let budget_spent = self
            .question_limit
            .is_some_and(|limit| self.total_questions as usize >= limit);
        let next = if budget_spent {
            None
        } else {
            next_question(&self.pool, rng).ok()
        };

        let step = match next {
            Some(question) => {
                self.state = QuizState::AwaitingAnswer {
                    question: question.clone(),
                };
                QuizStep::Question(question)
            }
            None => {
                let summary = QuizSummary::new(self.score, self.total_questions);
                log::info!(
                    "Quiz {} finished: {}/{} ({:.1}%)",
                    self.id,
                    summary.score,
                    summary.total_questions,
                    summary.percentage
                );
                self.state = QuizState::Finished {
                    summary: summary.clone(),
                };
                QuizStep::Finished(summary)
            }
        };

        Ok(AnswerFeedback {
            correct,
            correct_answer,
            score: self.score,
            next: step,
        })
    }

    /// Abandon the quiz, discarding the score
    pub fn cancel(&mut self) -> Result<()> {
        if self.is_terminal() {
            return Err(SchedulerError::InvalidTransition {
                state: self.state.name(),
                action: "cancel",
            });
        }
        log::info!("Quiz {} cancelled after {} answers", self.id, self.total_questions);
        self.score = 0;
        self.total_questions = 0;
        self.pool.clear();
        self.state = QuizState::Cancelled;
        Ok(())
    }
}
