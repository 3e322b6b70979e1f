//! Flashcard review session
//!
//! Each card starts face down (`ViewingFront`). Revealing shows the back,
//! and a rating moves on to the next card. Ratings are self-assessment
//! only; they are logged and reported in the summary but never touch the
//! learner's schedule.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduler::{Result, SchedulerError};
use crate::srs::LearnerId;
use crate::vocab::{Word, WordId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub word_id: WordId,
    pub front: String,
    pub back: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
}

impl From<&Word> for Card {
    fn from(word: &Word) -> Self {
        Self {
            word_id: word.id,
            front: word.original.clone(),
            back: word.translation.clone(),
            transcription: word.transcription.clone(),
            example_sentence: word.example_sentence.clone(),
        }
    }
}

/// Face of a card before it is revealed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFront {
    pub word_id: WordId,
    pub front: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    pub position: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardRating {
    Easy,
    Normal,
    Hard,
}

impl CardRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Some(Self::Easy),
            "normal" | "n" => Some(Self::Normal),
            "hard" | "h" => Some(Self::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRating {
    pub word_id: WordId,
    pub rating: CardRating,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSummary {
    pub cards_viewed: usize,
    pub revealed: usize,
    pub ratings: Vec<RecordedRating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlashcardState {
    ViewingFront,
    ViewingBack,
    Complete { summary: FlashcardSummary },
    Cancelled,
}

impl FlashcardState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ViewingFront => "viewing the front",
            Self::ViewingBack => "viewing the back",
            Self::Complete { .. } => "complete",
            Self::Cancelled => "cancelled",
        }
    }
}

/// What the learner sees right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum FlashcardView {
    Front(CardFront),
    Back(Card),
    Complete(FlashcardSummary),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct FlashcardSession {
    id: Uuid,
    learner: LearnerId,
    cards: Vec<Card>,
    cursor: usize,
    revealed: usize,
    ratings: Vec<RecordedRating>,
    state: FlashcardState,
}

impl FlashcardSession {
    /// Start over an ordered deck. An empty deck is complete at once.
    pub fn start(learner: LearnerId, cards: Vec<Card>) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            learner,
            cards,
            cursor: 0,
            revealed: 0,
            ratings: Vec::new(),
            state: FlashcardState::ViewingFront,
        };
        if session.cards.is_empty() {
            session.state = FlashcardState::Complete {
                summary: session.summary(),
            };
        }
        log::info!(
            "Flashcards {} started for learner {} with {} cards",
            session.id,
            learner,
            session.cards.len()
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn learner(&self) -> LearnerId {
        self.learner
    }

    pub fn state(&self) -> &FlashcardState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            FlashcardState::Complete { .. } | FlashcardState::Cancelled
        )
    }

    pub fn view(&self) -> FlashcardView {
        match &self.state {
            FlashcardState::ViewingFront => {
                let card = &self.cards[self.cursor];
                FlashcardView::Front(CardFront {
                    word_id: card.word_id,
                    front: card.front.clone(),
                    transcription: card.transcription.clone(),
                    position: self.cursor + 1,
                    total: self.cards.len(),
                })
            }
            FlashcardState::ViewingBack => FlashcardView::Back(self.cards[self.cursor].clone()),
            FlashcardState::Complete { summary } => FlashcardView::Complete(summary.clone()),
            FlashcardState::Cancelled => FlashcardView::Cancelled,
        }
    }

    /// Turn the current card over
    pub fn reveal(&mut self) -> Result<FlashcardView> {
        self.expect_state(FlashcardState::ViewingFront, "reveal")?;
        self.revealed += 1;
        self.state = FlashcardState::ViewingBack;
        Ok(self.view())
    }

    /// Move past the current card without revealing it
    pub fn skip(&mut self) -> Result<FlashcardView> {
        self.expect_state(FlashcardState::ViewingFront, "skip")?;
        self.advance();
        Ok(self.view())
    }

    /// Record a self-assessment for the revealed card and move on
    pub fn rate(&mut self, rating: CardRating) -> Result<FlashcardView> {
        self.expect_state(FlashcardState::ViewingBack, "rate")?;
        let word_id = self.cards[self.cursor].word_id;
        log::info!(
            "Flashcards {}: learner {} rated word {} as {}",
            self.id,
            self.learner,
            word_id,
            rating.as_str()
        );
        self.ratings.push(RecordedRating { word_id, rating });
        self.advance();
        Ok(self.view())
    }

    pub fn cancel(&mut self) -> Result<()> {
        if self.is_terminal() {
            return Err(SchedulerError::InvalidTransition {
                state: self.state.name(),
                action: "cancel",
            });
        }
        log::info!("Flashcards {} cancelled at card {}", self.id, self.cursor + 1);
        self.cards.clear();
        self.state = FlashcardState::Cancelled;
        Ok(())
    }

    fn expect_state(&self, expected: FlashcardState, action: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(SchedulerError::InvalidTransition {
                state: self.state.name(),
                action,
            });
        }
        Ok(())
    }

    fn advance(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.cards.len() {
            let summary = self.summary();
            log::info!(
                "Flashcards {} complete: {} viewed, {} revealed",
                self.id,
                summary.cards_viewed,
                summary.revealed
            );
            self.state = FlashcardState::Complete { summary };
        } else {
            self.state = FlashcardState::ViewingFront;
        }
    }

    fn summary(&self) -> FlashcardSummary {
        FlashcardSummary {
            cards_viewed: self.cursor.min(self.cards.len()),
            revealed: self.revealed,
            ratings: self.ratings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(count: usize) -> Vec<Card> {
        (1..=count as WordId)
            .map(|id| Card {
                word_id: id,
                front: format!("word{}", id),
                back: format!("перевод{}", id),
                transcription: None,
                example_sentence: None,
            })
            .collect()
    }

    #[test]
    fn test_front_hides_translation() {
        let session = FlashcardSession::start(1, deck(2));
        match session.view() {
            FlashcardView::Front(front) => {
                assert_eq!(front.front, "word1");
                assert_eq!(front.position, 1);
                assert_eq!(front.total, 2);
            }
            other => panic!("expected front, got {:?}", other),
        }
    }

    #[test]
    fn test_reveal_then_rate_walks_the_deck() {
        let mut session = FlashcardSession::start(1, deck(2));

        match session.reveal().unwrap() {
            FlashcardView::Back(card) => assert_eq!(card.back, "перевод1"),
            other => panic!("expected back, got {:?}", other),
        }
        assert!(matches!(
            session.rate(CardRating::Easy).unwrap(),
            FlashcardView::Front(_)
        ));

        session.reveal().unwrap();
        match session.rate(CardRating::Hard).unwrap() {
            FlashcardView::Complete(summary) => {
                assert_eq!(summary.cards_viewed, 2);
                assert_eq!(summary.revealed, 2);
                assert_eq!(
                    summary.ratings,
                    vec![
                        RecordedRating { word_id: 1, rating: CardRating::Easy },
                        RecordedRating { word_id: 2, rating: CardRating::Hard },
                    ]
                );
            }
            other => panic!("expected summary, got {:?}", other),
        }
        assert!(session.is_terminal());
    }

    #[test]
    fn test_skip_counts_as_viewed_only() {
        let mut session = FlashcardSession::start(1, deck(1));
        match session.skip().unwrap() {
            FlashcardView::Complete(summary) => {
                assert_eq!(summary.cards_viewed, 1);
                assert_eq!(summary.revealed, 0);
                assert!(summary.ratings.is_empty());
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_transitions() {
        let mut session = FlashcardSession::start(1, deck(2));
        assert!(matches!(
            session.rate(CardRating::Normal),
            Err(SchedulerError::InvalidTransition { action: "rate", .. })
        ));

        session.reveal().unwrap();
        assert!(session.reveal().is_err());
        assert!(session.skip().is_err());
    }

    #[test]
    fn test_empty_deck_is_complete() {
        let mut session = FlashcardSession::start(1, Vec::new());
        assert_eq!(session.view(), FlashcardView::Complete(FlashcardSummary::default()));
        assert!(session.cancel().is_err());
    }

    #[test]
    fn test_cancel() {
        let mut session = FlashcardSession::start(1, deck(3));
        session.reveal().unwrap();
        session.cancel().unwrap();

        assert_eq!(session.view(), FlashcardView::Cancelled);
        assert!(session.reveal().is_err());
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(CardRating::parse("Easy"), Some(CardRating::Easy));
        assert_eq!(CardRating::parse(" n "), Some(CardRating::Normal));
        assert_eq!(CardRating::parse("h"), Some(CardRating::Hard));
        assert_eq!(CardRating::parse("meh"), None);
    }
}
