use std::fmt;

use services::session::shuffled_choices;
use services::share::{detail_text, history_line};
use services::{
    AppServices, Clock, FetchOutcome, HistoryService, QuizLoopService, QuizSession,
    SessionError, TriviaApiConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play    [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- history [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- show  <game-id> [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- share <game-id> [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:brainbreak.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  BRAINBREAK_DB_URL, TRIVIA_API_BASE_URL, TRIVIA_AMOUNT,");
    eprintln!("  TRIVIA_DIFFICULTY, TRIVIA_TYPE, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Play,
    History,
    Show(String),
    Share(String),
}

struct Args {
    db_url: String,
    command: Command,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("BRAINBREAK_DB_URL")
            .unwrap_or_else(|_| "sqlite:brainbreak.sqlite3".into());
        let mut command = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "play" if command.is_none() => command = Some(Command::Play),
                "history" if command.is_none() => command = Some(Command::History),
                "show" if command.is_none() => {
                    command = Some(Command::Show(require_value(&mut args, "show")?));
                }
                "share" if command.is_none() => {
                    command = Some(Command::Share(require_value(&mut args, "share")?));
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url: normalize_sqlite_url(db_url),
            command: command.unwrap_or(Command::Play),
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

type InputLines = Lines<BufReader<Stdin>>;

async fn read_line(input: &mut InputLines) -> Result<String, Box<dyn std::error::Error>> {
    input.next_line().await?.ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "input closed").into()
    })
}

/// Prompt until the user picks a number in `1..=count`; returns the zero-based index.
async fn read_choice(
    input: &mut InputLines,
    count: usize,
) -> Result<usize, Box<dyn std::error::Error>> {
    loop {
        println!("Your answer (1-{count}):");
        let line = read_line(input).await?;
        match line.trim().parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(n - 1),
            _ => println!("Please enter a number between 1 and {count}."),
        }
    }
}

async fn play(quiz: &QuizLoopService) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut session = QuizSession::new();

    loop {
        println!("Loading today's trivia...");
        let ticket = session.load_ticket();
        let result = tokio::spawn(quiz.fetch_questions()).await?;
        match quiz.apply_fetch(&mut session, ticket, result) {
            FetchOutcome::Started { count } => debug!(count, "questions loaded"),
            FetchOutcome::Failed(failure) => {
                println!("{failure}");
                return Ok(());
            }
            FetchOutcome::Discarded => continue,
        }

        while let Some(question) = session.current_question() {
            let progress = session.progress();
            println!();
            println!(
                "[{}/{}] Category: {}",
                progress.answered + 1,
                progress.total,
                question.category()
            );
            println!("{}", question.text());
            let choices = shuffled_choices(question);
            for (index, choice) in choices.iter().enumerate() {
                println!("  {}) {choice}", index + 1);
            }

            let picked = read_choice(&mut input, choices.len()).await?;
            match quiz.submit_answer(&mut session, &choices[picked]).await {
                Ok(result) if result.answer.was_correct => {
                    println!("Correct! Score: {}", result.answer.score_after);
                }
                Ok(result) => println!("Wrong. Score: {}", result.answer.score_after),
                Err(SessionError::Storage(err)) if session.is_complete() => {
                    println!("Could not save this game: {err}");
                    retry_archive(quiz, &mut session, &mut input).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }

        println!();
        println!("Game Over! Your Score: {}", session.score());
        if let Some(id) = session.record_id() {
            println!("Saved to history as game {id}.");
        }
        println!("Restart game? [y/N]");
        let again = read_line(&mut input).await?;
        if !again.trim().eq_ignore_ascii_case("y") {
            return Ok(());
        }
        session.restart();
    }
}

/// Offer to re-save a completed game whose archive write failed.
async fn retry_archive(
    quiz: &QuizLoopService,
    session: &mut QuizSession,
    input: &mut InputLines,
) -> Result<(), Box<dyn std::error::Error>> {
    while session.record_id().is_none() {
        println!("Retry saving? [Y/n]");
        let answer = read_line(input).await?;
        if answer.trim().eq_ignore_ascii_case("n") {
            println!("Game not saved.");
            return Ok(());
        }
        if let Err(err) = quiz.finalize_record(session).await {
            println!("Could not save this game: {err}");
        }
    }
    Ok(())
}

async fn show_history(history: &HistoryService) -> Result<(), Box<dyn std::error::Error>> {
    let items = history.list_recent().await?;
    println!("Game History");
    println!();
    if items.is_empty() {
        println!("No game history available.");
        return Ok(());
    }
    for item in &items {
        println!("{}  (id {})", history_line(item.completed_at, item.score), item.key());
    }
    Ok(())
}

async fn show_detail(history: &HistoryService, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    match history.detail(key).await? {
        Some(record) => print!("{}", detail_text(&record)),
        None => println!("Game not found."),
    }
    Ok(())
}

async fn share(history: &HistoryService, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    match history.share_text(key).await? {
        Some(text) => print!("{text}"),
        None => println!("Game not found."),
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if matches!(argv.first().map(String::as_str), Some("--help" | "-h")) {
        print_usage();
        return Ok(());
    }

    let args = Args::parse(argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Storage and HTTP setup stay in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let trivia = TriviaApiConfig::from_env();
    let services =
        AppServices::new_sqlite(&args.db_url, Clock::default_clock(), &trivia).await?;

    let quiz = services.quiz_loop();
    let history = services.history();

    match &args.command {
        Command::Play => play(&quiz).await,
        Command::History => show_history(&history).await,
        Command::Show(key) => show_detail(&history, key).await,
        Command::Share(key) => share(&history, key).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
