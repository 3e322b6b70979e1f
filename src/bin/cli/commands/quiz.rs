use anyhow::{Context, Result};

use lexis_lib::session::{QuizQuestion, QuizStep, QuizVerdict};

use crate::app::App;
use crate::render::{paint, prompt, Color};

fn print_question(question: &QuizQuestion, number: u32) {
    println!();
    match &question.transcription {
        Some(transcription) => println!("{}. {} [{}]", number, question.prompt, transcription),
        None => println!("{}. {}", number, question.prompt),
    }
    for (i, option) in question.options.iter().enumerate() {
        println!("   {}) {}", i + 1, option);
    }
}

/// Interactive quiz. Answer with the option number; `q` quits.
pub fn run(app: &App, use_color: bool) -> Result<()> {
    let (id, mut question) = app
        .trainer
        .start_quiz(app.learner)
        .context("Failed to start quiz")?;
    let mut number = 1;
    print_question(&question, number);

    loop {
        let Some(input) = prompt("> ")? else {
            app.trainer.cancel_quiz(id)?;
            return Ok(());
        };
        if input.eq_ignore_ascii_case("q") {
            app.trainer.cancel_quiz(id)?;
            println!("Quiz cancelled.");
            return Ok(());
        }

        let answer = match input.parse::<usize>() {
            Ok(n) if (1..=question.options.len()).contains(&n) => question.options[n - 1].clone(),
            _ => {
                println!("Pick 1-{} or q to quit", question.options.len());
                continue;
            }
        };

        let feedback = app.trainer.answer_quiz(id, &answer)?;
        if feedback.correct {
            println!("{}", paint("Correct!", Color::GREEN, use_color));
        } else {
            println!(
                "{} The answer is: {}",
                paint("Wrong.", Color::RED, use_color),
                feedback.correct_answer
            );
        }

        match feedback.next {
            QuizStep::Question(next) => {
                number += 1;
                question = next;
                print_question(&question, number);
            }
            QuizStep::Finished(summary) => {
                let verdict = match summary.verdict {
                    QuizVerdict::Excellent => paint("Excellent!", Color::GREEN, use_color),
                    QuizVerdict::Good => paint("Good job!", Color::YELLOW, use_color),
                    QuizVerdict::KeepPracticing => paint("Keep practicing!", Color::RED, use_color),
                };
                println!();
                println!(
                    "Score: {}/{} ({:.0}%) {}",
                    summary.score, summary.total_questions, summary.percentage, verdict
                );
                return Ok(());
            }
        }
    }
}
