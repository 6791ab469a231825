use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use quiz_attempt::{Quiz, QuizError, export_result, load_quiz_from_json};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file to load the questions from
    #[arg(short, long)]
    questions: PathBuf,

    /// Minimum percentage to pass, overrides the quiz file
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    passing_threshold: Option<u8>,

    /// Time limit in seconds, overrides the quiz file
    #[arg(long)]
    time_limit: Option<u64>,

    /// Maximum number of attempts, overrides the quiz file
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Write the final result as JSON to this file
    #[arg(long)]
    results: Option<PathBuf>,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Some(path) = args.log_file.as_deref() {
        if let Err(e) = init_logging(path) {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            process::exit(1);
        }
    }

    if let Err(e) = run(args) {
        tracing::error!("{e}");
        eprintln!("Error running quiz: {}", e);
        process::exit(1);
    }
}

fn init_logging(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "quiz_attempt=info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), QuizError> {
    let definition = load_quiz_from_json(&args.questions)?;
    tracing::info!(
        path = %args.questions.display(),
        questions = definition.questions.len(),
        "quiz loaded"
    );

    let mut settings = definition.settings();
    if let Some(threshold) = args.passing_threshold {
        settings.passing_threshold = threshold;
    }
    if let Some(secs) = args.time_limit {
        settings.time_limit = Some(Duration::from_secs(secs));
    }
    if let Some(max_attempts) = args.max_attempts {
        settings.max_attempts = Some(max_attempts);
    }

    let quiz = Quiz::from_definition(definition, settings)?;
    let Some(result) = quiz.run()? else {
        return Ok(());
    };

    println!(
        "{} / {} pts ({}%) - {}",
        result.earned_points,
        result.total_points,
        result.percentage,
        if result.passed { "passed" } else { "failed" }
    );

    if let Some(path) = args.results {
        export_result(&result, path)?;
    }

    Ok(())
}
