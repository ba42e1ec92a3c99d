use clap::Parser;
use stamp_tally::api::{self, Mode};
use stamp_tally::args::{Args, Command};
use stamp_tally::{commands, Config, Result};
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::{debug, error, trace, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().stamps_home().path();
    let api_key = args.common().api_key();

    // This allows for running the program without calling the Gemini API. When
    // STAMPS_IN_TEST_MODE is set and non-zero in length, then the mode will be Mode::Test,
    // otherwise it will be Mode::Gemini.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Catalog => {
            let config = Config::load_or_default(home).await?;
            commands::catalog(&config).print()
        }

        Command::Tally(tally_args) => {
            let config = Config::load_or_default(home).await?;
            commands::tally(&config, tally_args)?.print()
        }

        Command::Suggest(suggest_args) => {
            let config = Config::load_or_default(home).await?;
            let gateway = api::gateway(&config, api_key, mode)?;
            commands::suggest(&gateway, &suggest_args.query())
                .await
                .print()
        }

        Command::Session => {
            let config = Config::load_or_default(home).await?;
            // The calculator works without suggestions, so a missing key is not fatal here.
            let gateway = match api::gateway(&config, api_key, mode) {
                Ok(gateway) => Some(gateway),
                Err(e) => {
                    warn!("Suggestions are disabled: {e:#}");
                    None
                }
            };
            let input = BufReader::new(tokio::io::stdin());
            commands::session(&config, gateway, input, tokio::io::stdout())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
