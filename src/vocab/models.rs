//! Data models for vocabulary entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row id of a vocabulary entry
pub type WordId = i64;

/// Coarse difficulty of a word, set by whoever manages the vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// A vocabulary entry shared by all learners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: WordId,
    /// Foreign-language text
    pub original: String,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    #[serde(default)]
    pub difficulty_level: DifficultyLevel,
    pub date_added: DateTime<Utc>,
}

/// Input for adding a word to the vocabulary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWord {
    pub original: String,
    pub translation: String,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub example_sentence: Option<String>,
    #[serde(default)]
    pub difficulty_level: DifficultyLevel,
}

impl NewWord {
    pub fn new(original: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            translation: translation.into(),
            ..Default::default()
        }
    }

    pub fn into_word(self, id: WordId, date_added: DateTime<Utc>) -> Word {
        Word {
            id,
            original: self.original,
            translation: self.translation,
            transcription: self.transcription.filter(|t| !t.is_empty()),
            example_sentence: self.example_sentence.filter(|s| !s.is_empty()),
            difficulty_level: self.difficulty_level,
            date_added,
        }
    }
}
