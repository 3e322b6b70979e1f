pub mod answer;
pub mod cards;
pub mod due;
pub mod pool;
pub mod profile;
pub mod quiz;
pub mod stats;
pub mod track;
pub mod words;
