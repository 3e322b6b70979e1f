use anyhow::{Context, Result};

use lexis_lib::session::{CardRating, FlashcardView};

use crate::app::App;
use crate::render::{paint, prompt, Color};

/// Interactive flashcards.
///
/// Front: enter reveals, `s` skips. Back: `e`/`n`/`h` rates. `q` quits.
pub fn run(app: &App, use_color: bool) -> Result<()> {
    let (id, mut view) = app
        .trainer
        .start_flashcards(app.learner)
        .context("Failed to start flashcards")?;

    loop {
        match &view {
            FlashcardView::Front(front) => {
                println!();
                println!(
                    "{} {}",
                    paint(&format!("[{}/{}]", front.position, front.total), Color::DIM, use_color),
                    paint(&front.front, Color::BOLD, use_color)
                );
                if let Some(transcription) = &front.transcription {
                    println!("  [{}]", transcription);
                }
            }
            FlashcardView::Back(card) => {
                println!("  = {}", paint(&card.back, Color::CYAN, use_color));
                if let Some(example) = &card.example_sentence {
                    println!("  {}", paint(example, Color::DIM, use_color));
                }
            }
            FlashcardView::Complete(summary) => {
                println!();
                println!(
                    "Done: {} card(s) viewed, {} revealed, {} rated",
                    summary.cards_viewed,
                    summary.revealed,
                    summary.ratings.len()
                );
                return Ok(());
            }
            FlashcardView::Cancelled => return Ok(()),
        }

        let label = match view {
            FlashcardView::Back(_) => "Rate (e)asy/(n)ormal/(h)ard > ",
            _ => "Enter to reveal, s to skip > ",
        };
        let Some(input) = prompt(label)? else {
            app.trainer.cancel_flashcards(id)?;
            return Ok(());
        };
        if input.eq_ignore_ascii_case("q") {
            app.trainer.cancel_flashcards(id)?;
            println!("Session cancelled.");
            return Ok(());
        }

        view = match view {
            FlashcardView::Front(_) if input.eq_ignore_ascii_case("s") => app.trainer.skip_card(id)?,
            FlashcardView::Front(_) => app.trainer.reveal_card(id)?,
            _ => match CardRating::parse(&input) {
                Some(rating) => app.trainer.rate_card(id, rating)?,
                None => continue,
            },
        };
    }
}
