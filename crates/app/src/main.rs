use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quiz_core::model::QuizSettings;
use quiz_core::QuestionBank;
use services::{Clock, QuizServices};

#[derive(Parser, Debug)]
#[command(name = "quiz-server")]
#[command(about = "Browser quiz server: sessions, questions, scoring and leaderboard")]
struct Args {
    /// SQLite database URL or path
    #[arg(long = "db", env = "QUIZ_DB_URL", default_value = "sqlite://quiz.sqlite3")]
    db_url: String,

    /// Server host
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "8080", env = "PORT")]
    port: u16,

    /// JSON question bank; the built-in set is used when omitted
    #[arg(long, env = "QUIZ_QUESTIONS")]
    questions: Option<PathBuf>,

    #[arg(long, default_value_t = 5, env = "QUIZ_QUESTIONS_PER_QUIZ")]
    questions_per_quiz: u32,

    #[arg(long, default_value_t = 10, env = "QUIZ_LEADERBOARD_SIZE")]
    leaderboard_size: u32,

    /// Minutes a session may sit idle before it is dropped
    #[arg(long, default_value_t = 24 * 60, env = "QUIZ_SESSION_IDLE_MINS")]
    session_idle_mins: i64,
}

#[derive(Debug)]
struct InvalidDbUrl(String);

impl std::fmt::Display for InvalidDbUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid --db value: {}", self.0)
    }
}

impl std::error::Error for InvalidDbUrl {}

fn normalize_sqlite_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" || trimmed.starts_with("sqlite://") {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
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
        .ok_or_else(|| InvalidDbUrl(db_url.to_owned()))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(InvalidDbUrl(db_url.to_owned()).into());
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

fn load_bank(path: Option<&PathBuf>) -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let bank = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            QuestionBank::from_json(&text).map_err(quiz_core::Error::from)?
        }
        None => QuestionBank::builtin().map_err(quiz_core::Error::from)?,
    };
    Ok(bank)
}

fn settings(args: &Args) -> Result<QuizSettings, quiz_core::Error> {
    Ok(QuizSettings::new(
        args.questions_per_quiz,
        args.leaderboard_size,
        chrono::Duration::minutes(args.session_idle_mins),
    )?)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let bank = load_bank(args.questions.as_ref())?;
    let settings = settings(&args)?;
    let db_url = normalize_sqlite_url(&args.db_url);

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&db_url)?;
    info!(db = %db_url, questions = bank.len(), "opening storage");
    let services = QuizServices::new_sqlite(&db_url, bank, settings, Clock::system()).await?;

    let sweeper = services.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            match sweeper.evict_idle() {
                Ok(0) => {}
                Ok(n) => info!(evicted = n, "dropped idle sessions"),
                Err(e) => warn!(error = %e, "idle sweep failed"),
            }
        }
    });

    let app = app::router(&services);
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,services=debug,app=debug")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
