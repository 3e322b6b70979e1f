//! Spaced repetition state for learners
//!
//! This module provides:
//! - Per-(learner, word) scheduling records
//! - Learner profiles with daily quotas
//! - The SM-2 update engine

pub mod algorithm;
pub mod models;

pub use models::*;
