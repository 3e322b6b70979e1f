//! Scheduling core
//!
//! This module provides:
//! - Due-word selection with new-word injection under daily quotas
//! - Atomic answer recording through the SM-2 engine
//! - Word pools for pairing games
//! - Learner statistics

mod error;
mod selection;
mod service;

pub use error::{Result, SchedulerError};
pub use selection::{GAME_DUE_LIMIT, GAME_POOL_CAP};
pub use service::{Scheduler, WordWithState};

