//! Interactive study sessions
//!
//! Quiz and flashcard sessions are plain state machines. The `Trainer`
//! keeps live sessions in a registry and wires correct quiz answers into
//! the scheduler.

mod flashcard;
mod quiz;
mod registry;
mod trainer;

pub use flashcard::{
    Card, CardFront, CardRating, FlashcardSession, FlashcardState, FlashcardSummary,
    FlashcardView, RecordedRating,
};
pub use quiz::{
    next_question, AnswerFeedback, QuestionDirection, QuizQuestion, QuizSession, QuizState,
    QuizStep, QuizSummary, QuizVerdict, QUIZ_CORRECT_QUALITY, QUIZ_OPTION_COUNT,
};
pub use registry::{Session, SessionRegistry};
pub use trainer::Trainer;
