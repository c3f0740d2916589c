use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use skyfetch_core::config::API_KEY_ENV;
use skyfetch_core::{AppError, Config, ConfigError, StorageError};
use skyfetch_services::{KeyValueStore, MemoryKvStore, SqliteKvStore};
use skyfetch_ui::{
    PresentationSurface, SearchOrchestrator, SearchSettings, TerminalSurface, ViewState,
};
use skyfetch_weather::OpenWeatherProvider;

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Recent,
    Pick(usize),
    Clear,
    Quit,
    Help,
}

impl Command {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            ":q" | ":quit" | ":exit" => Command::Quit,
            ":recent" => Command::Recent,
            ":clear" => Command::Clear,
            ":help" | ":h" => Command::Help,
            _ => match trimmed.strip_prefix(':').map(str::parse::<usize>) {
                Some(Ok(n)) => Command::Pick(n),
                _ => Command::Search(line.to_string()),
            },
        }
    }
}

const HELP: &str = "Type a city name to search. Commands: :recent, :<n> (search recent #n), :clear, :quit";

/// Print `text` without a newline and flush so it shows before input is read.
fn show_prompt<W: Write>(out: &mut W, text: &str) {
    if let Err(e) = write!(out, "{}", text).and_then(|()| out.flush()) {
        tracing::debug!("Failed to flush prompt: {}", e);
    }
}

fn prompt() {
    show_prompt(&mut std::io::stdout(), "> ");
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize core
    skyfetch_core::init()?;

    let (config, _warnings) = Config::load_validated()?;

    let api_key = config
        .weather
        .api_key
        .clone()
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|key| !key.trim().is_empty());
    let Some(api_key) = api_key else {
        let err = AppError::from(ConfigError::MissingSetting(format!(
            "weather.api_key (or the {} environment variable)",
            API_KEY_ENV
        )));
        eprintln!("{}", err.user_message());
        return Err(err.into());
    };

    let provider = OpenWeatherProvider::with_base_url(
        &api_key,
        &config.weather.base_url,
        Duration::from_secs(config.weather.request_timeout_secs),
    )?;

    let db_path = config.database_path();
    let store: Arc<dyn KeyValueStore> = match SqliteKvStore::open(&db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            let err = StorageError::Unavailable(format!("{}: {}", db_path.display(), e));
            tracing::warn!("{}; recent searches will not persist", err);
            eprintln!("{}", err.user_message());
            Arc::new(MemoryKvStore::new())
        }
    };

    let surface = Arc::new(TerminalSurface::stdout());
    let orchestrator = SearchOrchestrator::new(
        Arc::new(provider),
        store,
        surface.clone(),
        SearchSettings::from_config(&config),
    );

    tracing::info!("SkyFetch started");
    println!("SkyFetch - weather by city");
    println!("{}", HELP);

    orchestrator.load_recent_searches();
    orchestrator.restore_session().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Recent => {
                let cities = orchestrator.recent_searches();
                if cities.is_empty() {
                    println!("No recent searches.");
                } else {
                    surface.render(ViewState::recent_searches(&cities));
                }
            }
            Command::Pick(n) => match n.checked_sub(1).and_then(|i| orchestrator.recent_search(i)) {
                Some(city) => {
                    orchestrator.fetch_city(&city).await;
                }
                None => println!("No recent search #{}.", n),
            },
            Command::Clear => {
                show_prompt(&mut std::io::stdout(), "Clear all recent searches? [y/N] ");
                let answer = lines.next_line().await?.unwrap_or_default();
                if is_yes(&answer) {
                    if let Err(e) = orchestrator.clear_history() {
                        eprintln!("{}", e.user_message());
                    }
                }
            }
            Command::Search(query) => {
                orchestrator.search(&query).await;
            }
        }
        prompt();
    }

    tracing::info!("SkyFetch shutting down");
    Ok(())
}
