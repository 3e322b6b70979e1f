use anyhow::{Context, Result};

use crate::app::App;
use crate::render::print_json;
use crate::OutputFormat;

pub fn run(app: &App, min_words: Option<usize>, format: &OutputFormat) -> Result<()> {
    let min_words = min_words.unwrap_or(app.scheduler.config().game_min_words);
    let mut rng = app.rng();
    let pool = app
        .scheduler
        .select_pool(app.learner, min_words, &mut rng)
        .context("Failed to build a game pool")?;
    let words = app.scheduler.with_words(pool)?;

    match format {
        OutputFormat::Json => print_json(&words)?,
        OutputFormat::Plain => {
            println!("Game pool ({} words):", words.len());
            for entry in &words {
                println!("  {} = {}", entry.word.original, entry.word.translation);
            }
        }
    }

    Ok(())
}
