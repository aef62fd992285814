use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use workclock::cli::{parse_args, print_help};
use workclock::config::Config;
use workclock::holidays::{self, HolidayStore};
use workclock::server::{run_server, AppState};
use workclock::service::Calculator;
use workclock::timezone::Gateway;

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    if args.help {
        print_help();
        return Ok(());
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("workclock=info".parse().context("invalid log directive")?),
        )
        .init();

    info!("workclock v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!("  Timezone: {}", config.timezone);
    info!(
        "  Schedule: {}-{}, {}-{}",
        config.start_hour, config.lunch_start_hour, config.lunch_end_hour, config.end_hour
    );
    info!("  Holidays: {}", config.holiday_source());

    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    // Handle --validate mode
    if args.validate {
        info!("Configuration is valid");
        return Ok(());
    }

    // One-shot calculations are checked before the (slow) holiday load
    let one_shot = if args.calc {
        match args.calculation_request() {
            Ok(request) => Some(request),
            Err(message) => {
                error!("{}", message);
                std::process::exit(2);
            }
        }
    } else {
        None
    };

    // Holidays must be loaded before any calculation is served
    info!("Loading holidays...");
    let source = config.holiday_source();
    let calendar = match holidays::load(&source, config.holiday_fetch_timeout()).await {
        Ok(calendar) => calendar,
        Err(e) => {
            error!("Failed to load holidays: {}", e);
            std::process::exit(1);
        }
    };
    info!("Loaded {} holidays", calendar.len());

    let store = Arc::new(HolidayStore::new(calendar));
    let calculator = Calculator::new(Gateway::new(config.timezone), config.schedule()?, store.clone());

    if let Some(request) = one_shot {
        let result = calculator.calculate(&request)?;
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    let cancel_token = CancellationToken::new();

    if let Some(interval) = config.holiday_refresh_interval() {
        tokio::spawn(holidays::run_refresh_loop(
            source,
            config.holiday_fetch_timeout(),
            interval,
            store,
            cancel_token.clone(),
        ));
    }

    // Stop everything on Ctrl+C
    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    info!("Timezone: {}", config.timezone);
    let state = Arc::new(AppState::new(calculator, config.port));
    run_server(config.port, state, cancel_token)
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    Ok(())
}
