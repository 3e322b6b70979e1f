use anyhow::{Context, Result};

use crate::app::App;
use crate::render::print_json;
use crate::OutputFormat;

pub fn run(app: &App, word: i64, format: &OutputFormat) -> Result<()> {
    let state = app
        .scheduler
        .track_word(app.learner, word)
        .with_context(|| format!("Failed to track word {}", word))?;

    match format {
        OutputFormat::Json => print_json(&state)?,
        OutputFormat::Plain => {
            println!("Tracking word {} for learner {}", word, app.learner);
            println!("  Next review: {}", state.next_review.format("%Y-%m-%d %H:%M"));
        }
    }

    Ok(())
}
