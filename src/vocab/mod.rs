//! Vocabulary entries shared by every learner
//!
//! Words are read-only from the scheduler's point of view. Adding them is a
//! vocabulary-management concern exposed through the storage layer.

pub mod models;

pub use models::*;
