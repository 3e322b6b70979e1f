//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 algorithm for calculating
//! review intervals from the learner's recall quality.
//!
//! The ease factor is recomputed on every answer, failed ones included.
//! A failed answer resets `repetition` and `interval` to zero, so the
//! word is due again immediately.

use chrono::{DateTime, Duration, Utc};

use super::models::{InvalidQuality, LearnerWordState, Quality, MIN_EASE_FACTOR};

/// First successful recall: 1 day
pub const FIRST_INTERVAL: u32 = 1;

/// Second successful recall: 6 days
pub const SECOND_INTERVAL: u32 = 6;

/// Upper bound on an interval (100 years) so due dates stay representable
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Apply an answer with a raw quality value.
///
/// Values outside 0..=5 are rejected before anything is computed.
pub fn update(
    state: &LearnerWordState,
    quality: i32,
    now: DateTime<Utc>,
) -> Result<LearnerWordState, InvalidQuality> {
    let quality = Quality::new(quality)?;
    Ok(apply(state, quality, now))
}

/// Compute the next scheduling state for an answer of the given quality
pub fn apply(state: &LearnerWordState, quality: Quality, now: DateTime<Utc>) -> LearnerWordState {
    let mut next = state.clone();

    if quality.is_passing() {
        next.interval = match state.repetition {
            0 => FIRST_INTERVAL,
            1 => SECOND_INTERVAL,
            _ => grow_interval(state.interval, state.ease_factor),
        };
        next.repetition = state.repetition.saturating_add(1);
        next.correct_answers = state.correct_answers.saturating_add(1);
    } else {
        next.repetition = 0;
        next.interval = 0;
        next.wrong_answers = state.wrong_answers.saturating_add(1);
    }

    next.ease_factor = next_ease_factor(state.ease_factor, quality);
    next.next_review = now + Duration::days(next.interval as i64);
    next.last_reviewed = Some(now);

    log::debug!(
        "[SM2] learner={} word={} q={} interval {} -> {}, reps {} -> {}, EF {:.2} -> {:.2}",
        state.learner_id,
        state.word_id,
        quality.value(),
        state.interval,
        next.interval,
        state.repetition,
        next.repetition,
        state.ease_factor,
        next.ease_factor
    );

    next
}

/// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), floored at 1.3
pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
    let miss = (Quality::MAX - quality.value()) as f64;
    let ease_factor = ease_factor + (0.1 - miss * (0.08 + miss * 0.02));
    ease_factor.max(MIN_EASE_FACTOR)
}

fn grow_interval(interval: u32, ease_factor: f64) -> u32 {
    let grown = (interval as f64 * ease_factor).round();
    if grown >= MAX_INTERVAL_DAYS as f64 {
        MAX_INTERVAL_DAYS
    } else {
        grown as u32
    }
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    if days == 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
