mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lexis-cli", about = "Spaced-repetition vocabulary trainer", version)]
struct Cli {
    /// SQLite database (default: from config, else the local data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (default: <data dir>/lexis/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Learner to act as
    #[arg(long, global = true, default_value = "1")]
    learner: i64,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the shared vocabulary
    #[command(subcommand)]
    Words(WordsCommand),

    /// Start tracking a word for the learner
    Track {
        /// Word id
        word: i64,
    },

    /// Show the words to study now (may pull in new words)
    Due {
        /// Override the learner's daily review limit
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Record an answer for a tracked word
    Answer {
        /// Word id
        word: i64,
        /// Recall quality, 0 (blackout) to 5 (perfect)
        quality: i32,
    },

    /// Show learning statistics
    Stats,

    /// Build a word pool for a matching game
    Pool {
        /// Minimum number of words the game needs
        #[arg(long)]
        min_words: Option<usize>,
    },

    /// Show or change daily quotas
    Profile {
        /// Words per review session
        #[arg(long)]
        daily_limit: Option<u32>,
        /// New words injected per selection
        #[arg(long)]
        new_words: Option<u32>,
    },

    /// Take a multiple-choice quiz
    Quiz,

    /// Review flashcards
    Cards,
}

#[derive(Subcommand)]
enum WordsCommand {
    /// Add a word to the vocabulary
    Add {
        /// Foreign-language text
        original: String,
        /// Translation
        translation: String,
        #[arg(long)]
        transcription: Option<String>,
        /// Example sentence
        #[arg(long)]
        example: Option<String>,
        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,
    },

    /// List the vocabulary
    List,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.db, cli.config.as_deref(), cli.learner)?;

    match cli.command {
        Command::Words(WordsCommand::Add {
            original,
            translation,
            transcription,
            example,
            difficulty,
        }) => {
            commands::words::run_add(
                &app,
                original,
                translation,
                transcription,
                example,
                &difficulty,
                &cli.format,
            )?;
        }
        Command::Words(WordsCommand::List) => {
            commands::words::run_list(&app, &cli.format)?;
        }
        Command::Track { word } => {
            commands::track::run(&app, word, &cli.format)?;
        }
        Command::Due { limit } => {
            commands::due::run(&app, limit, &cli.format, use_color)?;
        }
        Command::Answer { word, quality } => {
            commands::answer::run(&app, word, quality, &cli.format, use_color)?;
        }
        Command::Stats => {
            commands::stats::run(&app, &cli.format, use_color)?;
        }
        Command::Pool { min_words } => {
            commands::pool::run(&app, min_words, &cli.format)?;
        }
        Command::Profile { daily_limit, new_words } => {
            commands::profile::run(&app, daily_limit, new_words, &cli.format)?;
        }
        Command::Quiz => {
            commands::quiz::run(&app, use_color)?;
        }
        Command::Cards => {
            commands::cards::run(&app, use_color)?;
        }
    }

    Ok(())
}
