use std::process::ExitCode;

use chrono::Local;
use tracing::error;
use tracing_subscriber::EnvFilter;

use departure_board::board::{Board, BoardError, load_board};
use departure_board::config::BoardConfig;
use departure_board::source::{HttpSource, MockSource};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            eprintln!("Set BOARD_STATION_ID (or BOARD_MOCK_DIR) to choose a stop.");
            return ExitCode::FAILURE;
        }
    };

    match run(&config).await {
        Ok(board) => {
            println!("{board}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("failed to load departures: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &BoardConfig) -> Result<Board, BoardError> {
    let now = Local::now();
    match &config.mock_dir {
        Some(dir) => {
            let source = MockSource::new(dir, &config.station_id);
            load_board(&source, config, &now).await
        }
        None => {
            let source = HttpSource::new(config)?;
            load_board(&source, config, &now).await
        }
    }
}
