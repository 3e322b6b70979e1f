//! Data models for per-learner scheduling state

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vocab::WordId;

/// Row id of a learner account
pub type LearnerId = i64;

/// Starting ease factor for a freshly tracked word
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lowest ease factor SM-2 allows
pub const MIN_EASE_FACTOR: f64 = 1.3;

pub const DEFAULT_DAILY_REVIEW_LIMIT: u32 = 20;
pub const DEFAULT_DAILY_NEW_WORDS: u32 = 5;

/// Answers graded at or above this quality count as recalled
pub const PASSING_QUALITY: u8 = 3;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Quality must be within 0..=5, got {0}")]
pub struct InvalidQuality(pub i32);

/// SM-2 recall grade (0-5)
///
/// - 0: Complete blackout, no recall
/// - 1: Incorrect, but upon seeing answer, remembered
/// - 2: Incorrect, but answer seemed easy to recall
/// - 3: Correct response with serious difficulty
/// - 4: Correct response after hesitation
/// - 5: Perfect response with no hesitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quality(u8);

impl Quality {
    pub const MAX: u8 = 5;

    pub fn new(value: i32) -> Result<Self, InvalidQuality> {
        if (0..=Self::MAX as i32).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(InvalidQuality(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_passing(self) -> bool {
        self.0 >= PASSING_QUALITY
    }
}

impl TryFrom<i32> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for i32 {
    fn from(quality: Quality) -> Self {
        quality.0 as i32
    }
}

/// Scheduling record for one (learner, word) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerWordState {
    pub learner_id: LearnerId,
    pub word_id: WordId,
    /// Consecutive successful recalls since the last reset
    #[serde(default)]
    pub repetition: u32,
    /// Days until the next review
    #[serde(default)]
    pub interval: u32,
    /// SM-2 ease factor, never below 1.3
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    pub next_review: DateTime<Utc>,
    #[serde(default)]
    pub correct_answers: u32,
    #[serde(default)]
    pub wrong_answers: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

impl LearnerWordState {
    pub fn new(learner_id: LearnerId, word_id: WordId, next_review: DateTime<Utc>) -> Self {
        Self {
            learner_id,
            word_id,
            repetition: 0,
            interval: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_review,
            correct_answers: 0,
            wrong_answers: 0,
            last_reviewed: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

/// Per-learner quotas and running totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub learner_id: LearnerId,
    /// Max due + new words surfaced per session
    #[serde(default = "default_daily_review_limit")]
    pub daily_review_limit: u32,
    /// Max new words injected per session
    #[serde(default = "default_daily_new_words")]
    pub daily_new_words: u32,
    #[serde(default)]
    pub total_reviews: u64,
    #[serde(default)]
    pub total_words_learned: u32,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_date: Option<NaiveDate>,
}

fn default_daily_review_limit() -> u32 {
    DEFAULT_DAILY_REVIEW_LIMIT
}

fn default_daily_new_words() -> u32 {
    DEFAULT_DAILY_NEW_WORDS
}

impl LearnerProfile {
    pub fn new(learner_id: LearnerId) -> Self {
        Self::with_limits(learner_id, DEFAULT_DAILY_REVIEW_LIMIT, DEFAULT_DAILY_NEW_WORDS)
    }

    pub fn with_limits(learner_id: LearnerId, daily_review_limit: u32, daily_new_words: u32) -> Self {
        Self {
            learner_id,
            daily_review_limit,
            daily_new_words,
            total_reviews: 0,
            total_words_learned: 0,
            streak_days: 0,
            last_review_date: None,
        }
    }

    /// Advance the daily streak for a review made on `today`
    pub fn register_review_day(&mut self, today: NaiveDate) {
        self.streak_days = match self.last_review_date {
            Some(last) if last == today => self.streak_days.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.streak_days + 1,
            _ => 1,
        };
        self.last_review_date = Some(today);
    }
}

/// Progress summary for a learner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerStats {
    pub total_words: usize,
    /// Tracked but never recalled successfully
    pub new_words: usize,
    pub learning_words: usize,
    pub learned_words: usize,
    pub today_words: usize,
    pub total_reviews: u64,
    pub streak_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_quality_bounds() {
        assert!(Quality::new(0).is_ok());
        assert!(Quality::new(5).is_ok());
        assert_eq!(Quality::new(6), Err(InvalidQuality(6)));
        assert_eq!(Quality::new(-1), Err(InvalidQuality(-1)));
        assert!(Quality::new(3).unwrap().is_passing());
        assert!(!Quality::new(2).unwrap().is_passing());
    }

    #[test]
    fn test_quality_rejects_out_of_range_json() {
        let ok: Quality = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Quality>("9").is_err());
    }

    #[test]
    fn test_new_state_defaults() {
        let now = Utc::now();
        let state = LearnerWordState::new(1, 2, now);
        assert_eq!(state.repetition, 0);
        assert_eq!(state.interval, 0);
        assert_eq!(state.ease_factor, DEFAULT_EASE_FACTOR);
        assert!(state.is_due(now));
        assert!(!state.is_due(now - Duration::seconds(1)));
        assert!(state.last_reviewed.is_none());
    }

    #[test]
    fn test_streak_progression() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut profile = LearnerProfile::new(1);

        profile.register_review_day(day);
        assert_eq!(profile.streak_days, 1);

        profile.register_review_day(day);
        assert_eq!(profile.streak_days, 1);

        profile.register_review_day(day.succ_opt().unwrap());
        assert_eq!(profile.streak_days, 2);

        profile.register_review_day(day + Duration::days(5));
        assert_eq!(profile.streak_days, 1);
    }
}
