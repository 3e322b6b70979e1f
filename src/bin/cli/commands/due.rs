use anyhow::{Context, Result};

use lexis_lib::srs::algorithm::format_interval;

use crate::app::App;
use crate::render::{paint, print_json, Color};
use crate::OutputFormat;

pub fn run(app: &App, limit: Option<usize>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut rng = app.rng();
    let selected = app
        .scheduler
        .select_due(app.learner, limit, &mut rng)
        .context("Failed to select due words")?;
    let words = app.scheduler.with_words(selected)?;

    match format {
        OutputFormat::Json => print_json(&words)?,
        OutputFormat::Plain => {
            if words.is_empty() {
                println!("Nothing to review right now.");
                return Ok(());
            }

            println!("{} word(s) to review:", words.len());
            for entry in &words {
                let status = if entry.state.repetition == 0 {
                    paint("new", Color::CYAN, use_color)
                } else {
                    paint(
                        &format!("every {}", format_interval(entry.state.interval)),
                        Color::DIM,
                        use_color,
                    )
                };
                println!(
                    "{:>5}  {} = {}  ({})",
                    entry.word.id, entry.word.original, entry.word.translation, status
                );
            }
        }
    }

    Ok(())
}
