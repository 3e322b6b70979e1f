use anyhow::{Context, Result};

use crate::app::App;
use crate::render::{paint, print_json, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let mut rng = app.rng();
    let stats = app
        .scheduler
        .statistics(app.learner, &mut rng)
        .context("Failed to compute statistics")?;

    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Plain => {
            println!("{}", paint("Learning statistics", Color::BOLD, use_color));
            println!("  Words tracked:   {}", stats.total_words);
            println!("  New:             {}", stats.new_words);
            println!("  Learning:        {}", stats.learning_words);
            println!("  Learned:         {}", stats.learned_words);
            println!("  Due today:       {}", stats.today_words);
            println!("  Total reviews:   {}", stats.total_reviews);
            println!("  Streak:          {} day(s)", stats.streak_days);
        }
    }

    Ok(())
}
