use anyhow::{Context, Result};

use crate::app::App;
use crate::render::print_json;
use crate::OutputFormat;

pub fn run(
    app: &App,
    daily_limit: Option<u32>,
    new_words: Option<u32>,
    format: &OutputFormat,
) -> Result<()> {
    let profile = if daily_limit.is_some() || new_words.is_some() {
        app.scheduler
            .configure_profile(app.learner, daily_limit, new_words)
            .context("Failed to update profile")?
    } else {
        app.scheduler.profile(app.learner).context("Failed to load profile")?
    };

    match format {
        OutputFormat::Json => print_json(&profile)?,
        OutputFormat::Plain => {
            println!("Learner {}", profile.learner_id);
            println!("  Daily review limit: {}", profile.daily_review_limit);
            println!("  New words per day:  {}", profile.daily_new_words);
            println!("  Words learned:      {}", profile.total_words_learned);
            if let Some(date) = profile.last_review_date {
                println!("  Last review:        {}", date);
            }
        }
    }

    Ok(())
}
