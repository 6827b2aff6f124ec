use anyhow::Result;
use clap::{Parser, Subcommand};
use xrate::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for xrate::AppCommand {
    fn from(cmd: Commands) -> xrate::AppCommand {
        match cmd {
            Commands::Convert {
                base,
                target,
                amount,
            } => xrate::AppCommand::Convert {
                base,
                target,
                amount,
            },
            Commands::History => xrate::AppCommand::History,
            Commands::Stats { base, target } => xrate::AppCommand::Stats { base, target },
            Commands::Interactive => xrate::AppCommand::Interactive,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount from one currency to another
    Convert {
        /// Currency to convert from, e.g. BTC
        base: String,
        /// Currency to convert to, e.g. USDT
        target: String,
        /// Amount of the base currency
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// List all recorded conversions
    History,
    /// Show max/min/average rate for a currency pair
    Stats {
        base: String,
        target: String,
    },
    /// Run an interactive prompt (default)
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xrate::cli::setup::setup(),
        Some(cmd) => xrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            xrate::run_command(xrate::AppCommand::Interactive, cli.config_path.as_deref()).await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
        // Domain errors already carry their cause in the message
        let message = if e.downcast_ref::<xrate::core::ExchangeError>().is_some() {
            e.to_string()
        } else {
            format!("{e:#}")
        };
        xrate::cli::ui::print_error(&message);
        std::process::exit(1);
    }
    Ok(())
}
