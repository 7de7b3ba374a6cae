use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{LevelFilter, info};
use std::io::Write;
use std::sync::Arc;

use homework_bot::cli::{Cli, Commands};
use homework_bot::config::{Config, Credentials};
use homework_bot::notify::TelegramNotifier;
use homework_bot::poller::{CycleOutcome, Poller, PollerConfig};
use homework_bot::practicum::PracticumClient;

fn rust_log_is_set() -> bool {
    std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some()
}

fn setup_logging(verbose: bool) -> Result<()> {
    // The backend admits debug; the global max level does the actual filtering
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .try_init()
        .context("Failed to initialize logger")?;

    if let Some(level) = resolve_log_level(rust_log_is_set(), verbose, None) {
        log::set_max_level(level);
    }
    Ok(())
}

/// Effective max level: RUST_LOG, then --verbose, then config, then info.
/// `None` leaves the level to RUST_LOG.
fn resolve_log_level(rust_log_set: bool, verbose: bool, config_level: Option<&str>) -> Option<LevelFilter> {
    if rust_log_set {
        return None;
    }
    if verbose {
        return Some(LevelFilter::Debug);
    }
    let level = config_level
        .and_then(|level| match level.parse::<LevelFilter>() {
            Ok(filter) => Some(filter.min(LevelFilter::Debug)),
            Err(_) => {
                log::warn!("Ignoring unknown log_level '{}'", level);
                None
            }
        })
        .unwrap_or(LevelFilter::Info);
    Some(level)
}

fn apply_config_log_level(config: &Config, verbose: bool) {
    if let Some(level) = resolve_log_level(rust_log_is_set(), verbose, config.log_level.as_deref()) {
        log::set_max_level(level);
    }
}

fn load_credentials() -> Result<Credentials> {
    Credentials::from_env()
        .inspect_err(|e| log::error!("{}. Program stopped.", e))
        .context("Required environment variables are not set")
}

fn handle_check_command(config: &Config) -> Result<()> {
    println!("{} {}", "Endpoint:".cyan(), config.practicum.endpoint);
    println!("{} {}", "Telegram API:".cyan(), config.telegram.api_base);
    println!("{} {}s", "Poll interval:".cyan(), config.poll.interval_secs);

    let credentials = load_credentials()?;
    println!(
        "{} tokens present, chat id {}",
        "Credentials:".green(),
        credentials.telegram_chat_id
    );
    Ok(())
}

async fn handle_run_command(config: &Config, once: bool) -> Result<()> {
    let credentials = load_credentials()?;

    let source = PracticumClient::new(credentials.practicum_token.clone(), &config.practicum)
        .context("Failed to create Practicum client")?;
    let notifier = TelegramNotifier::new(
        credentials.telegram_token.clone(),
        credentials.telegram_chat_id.clone(),
        &config.telegram,
    )
    .context("Failed to create Telegram notifier")?;

    let mut poller = Poller::new(Arc::new(source), Arc::new(notifier), PollerConfig::from(config));

    if once {
        match poller.run_cycle().await {
            CycleOutcome::Notified(text) => println!("{} {}", "Sent:".green(), text),
            CycleOutcome::NoChange => println!("{}", "No status change".yellow()),
            CycleOutcome::Failed { error, .. } => println!("{} {}", "Failed:".red(), error),
        }
        return Ok(());
    }

    poller.run(shutdown_signal()).await;
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging before anything can log
    setup_logging(cli.is_verbose()).context("Failed to setup logging")?;

    // Load configuration
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(secs) = cli.interval {
        config.poll.interval_secs = secs;
    }
    apply_config_log_level(&config, cli.is_verbose());
    config.validate().context("Invalid configuration")?;

    info!("Bot started");

    match cli.command.clone().unwrap_or_default() {
        Commands::Check => handle_check_command(&config),
        Commands::Run { once } => handle_run_command(&config, once).await,
    }
}
