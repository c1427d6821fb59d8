use std::fs::File;
use std::process::ExitCode;

use campus_assistant::api::{ApiError, ChatBackend, HttpClient};
use campus_assistant::core::config::{self, CliOverrides, ResolvedConfig};
use campus_assistant::tui;
use clap::{Parser, Subcommand};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "campus", about = "Terminal client for the CMU-Africa campus assistant", version)]
struct Args {
    /// Backend base URL (overrides config and CAMPUS_API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Academic program sent with each question
    #[arg(long)]
    program: Option<String>,

    /// Year of study sent with each question
    #[arg(long)]
    year: Option<u32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy, Debug)]
enum Command {
    /// Interactive chat (default)
    Chat,
    /// Print the backend health report
    Health,
    /// Print knowledge-base index statistics
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The terminal belongs to the TUI, so logs go to a file
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create("campus-assistant.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let cli = CliOverrides {
        base_url: args.base_url,
        program: args.program,
        year: args.year,
    };
    let resolved = config::resolve(&file_config, &cli);

    let command = args.command.unwrap_or(Command::Chat);
    log::info!("Campus assistant starting: {:?} against {}", command, resolved.base_url);

    match command {
        Command::Chat => match tui::run(resolved) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("terminal error: {e}");
                ExitCode::FAILURE
            }
        },
        Command::Health | Command::Stats => diagnose(command, &resolved).await,
    }
}

async fn fetch(command: Command, config: &ResolvedConfig) -> Result<serde_json::Value, ApiError> {
    let client = HttpClient::new(config.base_url.clone(), config.timeout)?;
    match command {
        Command::Stats => client.index_stats().await,
        _ => client.health_check().await,
    }
}

/// One-shot GET against a diagnostics endpoint, pretty-printed to stdout.
async fn diagnose(command: Command, config: &ResolvedConfig) -> ExitCode {
    match fetch(command, config).await.and_then(|v| {
        serde_json::to_string_pretty(&v).map_err(|e| ApiError::Parse(e.to_string()))
    }) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::warn!("{:?} failed: {}", command, e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
