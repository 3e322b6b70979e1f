//! Storage for vocabulary, learner progress and learner profiles
//!
//! The scheduler only talks to the traits in this module. Two backends
//! ship with the crate:
//! - `MemoryStore` for embedding and tests
//! - `SqliteStore` for durable, multi-process use

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ProfileStore, ProgressStore, VocabularyStore};
