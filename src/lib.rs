//! Spaced-repetition vocabulary scheduling
//!
//! - `srs`: SM-2 model and update rule
//! - `scheduler`: due selection, answer recording, game pools, statistics
//! - `session`: quiz and flashcard state machines
//! - `storage`: in-memory and SQLite stores

pub mod clock;
pub mod config;
pub mod scheduler;
pub mod session;
pub mod srs;
pub mod storage;
pub mod vocab;

pub use config::EngineConfig;
pub use scheduler::{Scheduler, SchedulerError};
pub use session::Trainer;
