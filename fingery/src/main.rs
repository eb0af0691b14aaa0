use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cadence::{AnalysisRequest, Clock, SystemClock, provider};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::app::{App, Services};
use crate::config::Config;
use crate::error::AppError;
use crate::report::HistoryStore;

mod app;
mod config;
mod error;
mod identity;
mod logging;
mod remote;
mod report;
mod view;
mod words;

/// A minimalist typing-speed test for your terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Directory holding `settings.toml`, logs and history
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use the built-in words and local analytics only
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Take a typing test (default)
    Run {
        /// Words in the passage
        #[arg(short, long)]
        words: Option<usize>,
    },
    /// Analyze a saved session request locally and print the result as JSON
    Replay {
        file: PathBuf,

        /// Number of time bins
        #[arg(short, long)]
        bins: Option<usize>,
    },
    /// List past sessions, newest first
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the effective settings
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "exiting");
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::get(cli.config)?;
    logging::init(&config.log_file())?;
    info!(config_dir = %config.config_dir.display(), "starting");

    match cli.command.unwrap_or(Command::Run { words: None }) {
        Command::Run { words } => {
            let services = Services::from_config(&config, cli.offline)?;
            let word_count = words.unwrap_or(config.settings.words.count);
            App::new(
                SystemClock,
                services,
                config.settings.engine.clone(),
                word_count,
            )
            .run()
        }
        Command::Replay { file, bins } => replay(&config, &file, bins),
        Command::History { limit } => history(&config, limit),
        Command::Config => {
            let mut settings = config.settings.clone();
            settings.identity = settings.identity.redacted();
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

fn replay(config: &Config, file: &Path, bins: Option<usize>) -> Result<(), AppError> {
    let content = std::fs::read_to_string(file).map_err(|error| AppError::ReadSession {
        path: file.to_path_buf(),
        error,
    })?;
    let request: AnalysisRequest = serde_json::from_str(&content)?;

    let engine = &config.settings.engine;
    let analysis = provider::analyze(
        &request,
        None,
        bins.unwrap_or(engine.bins),
        &engine.analytics(),
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&analysis).map_err(AppError::Output)?
    );
    Ok(())
}

fn history(config: &Config, limit: usize) -> Result<(), AppError> {
    let store = HistoryStore::new(config.history_dir(), 0)?;
    let entries = store.load_all()?;

    if entries.is_empty() {
        println!("No sessions in {}", store.directory().display());
        return Ok(());
    }

    let now = SystemClock.now_ms();
    for entry in entries.iter().take(limit) {
        let record = &entry.analysis.record;
        println!(
            "{:>10}  {:<12} {:>3} wpm  {:>3}% acc  {:>3}% consistency  {:>5.1}s",
            ago(now.saturating_sub(entry.timestamp_ms) / 1000),
            entry.user,
            record.wpm,
            record.accuracy,
            record.consistency,
            record.time_taken_seconds,
        );
    }

    Ok(())
}

/// Rough age of a history entry
fn ago(seconds: u64) -> String {
    match seconds {
        0..60 => format!("{seconds}s ago"),
        60..3_600 => format!("{}m ago", seconds / 60),
        3_600..86_400 => format!("{}h ago", seconds / 3_600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();

        let cli = Cli::parse_from(["fingery", "--offline", "replay", "session.json", "-b", "4"]);
        assert!(cli.offline);
        assert!(matches!(
            cli.command,
            Some(Command::Replay { bins: Some(4), .. })
        ));

        let cli = Cli::parse_from(["fingery"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_ago() {
        assert_eq!(ago(5), "5s ago");
        assert_eq!(ago(120), "2m ago");
        assert_eq!(ago(7_200), "2h ago");
        assert_eq!(ago(172_800), "2d ago");
    }
}
