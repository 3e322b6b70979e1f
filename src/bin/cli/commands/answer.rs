use anyhow::{Context, Result};

use lexis_lib::srs::algorithm::format_interval;

use crate::app::App;
use crate::render::{paint, print_json, Color};
use crate::OutputFormat;

pub fn run(app: &App, word: i64, quality: i32, format: &OutputFormat, use_color: bool) -> Result<()> {
    let state = app
        .scheduler
        .record_answer(app.learner, word, quality)
        .with_context(|| format!("Failed to record answer for word {}", word))?;

    match format {
        OutputFormat::Json => print_json(&state)?,
        OutputFormat::Plain => {
            let verdict = if quality >= 3 {
                paint("remembered", Color::GREEN, use_color)
            } else {
                paint("forgotten", Color::RED, use_color)
            };
            println!("Word {} {}", word, verdict);
            println!(
                "  Next review in {} ({})",
                format_interval(state.interval),
                state.next_review.format("%Y-%m-%d")
            );
            println!("  Ease factor: {:.2}", state.ease_factor);
        }
    }

    Ok(())
}
