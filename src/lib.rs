pub mod cli;
pub mod core;
pub mod providers;

// Kept at the crate root for callers that only need configuration
pub use crate::core::config;

use crate::core::{ConversionLedger, HistoryFile};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Actions that run against the conversion ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Convert {
        base: String,
        target: String,
        amount: String,
    },
    History,
    Stats {
        base: String,
        target: String,
    },
    Interactive,
}

/// Opens the ledger described by the configuration, reporting an unreadable
/// history file as a warning.
pub fn open_ledger(config: &config::AppConfig) -> Result<ConversionLedger> {
    let provider = providers::BinanceRateProvider::new(
        config.binance_base_url(),
        &config.reference_currency,
    )?;
    let history_path = config.history_path()?;
    debug!("Using history file {}", history_path.display());

    let (ledger, warning) =
        ConversionLedger::open(Arc::new(provider), HistoryFile::new(history_path));
    if let Some(warning) = warning {
        cli::ui::print_warning(&format!("{warning}. Starting with an empty history."));
    }
    Ok(ledger)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let mut ledger = open_ledger(&config)?;

    match command {
        AppCommand::Convert {
            base,
            target,
            amount,
        } => cli::convert::run(&mut ledger, &base, &target, &amount).await,
        AppCommand::History => {
            cli::history::run(ledger.history());
            Ok(())
        }
        AppCommand::Stats { base, target } => cli::stats::run(&ledger, &base, &target),
        AppCommand::Interactive => cli::interactive::run(&mut ledger).await,
    }
}
