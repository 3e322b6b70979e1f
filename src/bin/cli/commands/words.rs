use anyhow::{bail, Context, Result};

use lexis_lib::storage::VocabularyStore;
use lexis_lib::vocab::{DifficultyLevel, NewWord};

use crate::app::App;
use crate::render::print_json;
use crate::OutputFormat;

pub fn run_add(
    app: &App,
    original: String,
    translation: String,
    transcription: Option<String>,
    example: Option<String>,
    difficulty: &str,
    format: &OutputFormat,
) -> Result<()> {
    let Some(difficulty_level) = DifficultyLevel::parse(difficulty) else {
        bail!("Unknown difficulty '{}'. Use easy, medium or hard", difficulty);
    };
    if original.trim().is_empty() || translation.trim().is_empty() {
        bail!("Both the word and its translation are required");
    }

    let word = app
        .store
        .add_word(NewWord {
            original: original.trim().to_string(),
            translation: translation.trim().to_string(),
            transcription,
            example_sentence: example,
            difficulty_level,
        })
        .context("Failed to add word")?;

    match format {
        OutputFormat::Json => print_json(&word)?,
        OutputFormat::Plain => {
            println!("Added \"{}\" = \"{}\"", word.original, word.translation);
            println!("  ID: {}", word.id);
        }
    }

    Ok(())
}

pub fn run_list(app: &App, format: &OutputFormat) -> Result<()> {
    let words = app.store.all_words().context("Failed to list words")?;

    match format {
        OutputFormat::Json => print_json(&words)?,
        OutputFormat::Plain => {
            if words.is_empty() {
                println!("Vocabulary is empty. Add words with `lexis-cli words add`.");
                return Ok(());
            }

            let width = words.iter().map(|w| w.original.chars().count()).max().unwrap_or(4).clamp(4, 30);
            println!("{:>5}  {:<width$}  {}", "ID", "Word", "Translation", width = width);
            for word in &words {
                let transcription = word
                    .transcription
                    .as_deref()
                    .map(|t| format!(" [{}]", t))
                    .unwrap_or_default();
                println!(
                    "{:>5}  {:<width$}  {}{}",
                    word.id,
                    word.original,
                    word.translation,
                    transcription,
                    width = width
                );
            }
        }
    }

    Ok(())
}
