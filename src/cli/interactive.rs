//! A prompt loop over a single ledger. Every action reports its own error and
//! the loop keeps going.

use super::{convert, history, stats, ui};
use crate::core::ConversionLedger;
use anyhow::Result;
use console::Term;
use tracing::debug;

const HELP: &str = "\
Commands:
  convert <BASE> <TARGET> <AMOUNT>   Convert an amount and record it
  history                            List all recorded conversions
  stats <BASE> <TARGET>              Max/min/average rate for a pair
  help                               Show this message
  quit                               Leave";

#[derive(Debug, PartialEq)]
pub enum PromptCommand {
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
    Help,
    Quit,
    Empty,
}

pub fn parse_line(line: &str) -> std::result::Result<PromptCommand, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((name, args)) = parts.split_first() else {
        return Ok(PromptCommand::Empty);
    };

    match (name.to_lowercase().as_str(), args) {
        ("convert" | "c", [base, target, amount]) => Ok(PromptCommand::Convert {
            base: base.to_string(),
            target: target.to_string(),
            amount: amount.to_string(),
        }),
        ("history" | "h", []) => Ok(PromptCommand::History),
        ("stats" | "s", [base, target]) => Ok(PromptCommand::Stats {
            base: base.to_string(),
            target: target.to_string(),
        }),
        ("help" | "?", []) => Ok(PromptCommand::Help),
        ("quit" | "exit" | "q", []) => Ok(PromptCommand::Quit),
        ("convert" | "c" | "history" | "h" | "stats" | "s" | "help" | "?" | "quit" | "exit"
        | "q", _) => Err(format!("Wrong number of arguments for '{name}'. Type 'help'.")),
        _ => Err(format!("Unknown command '{name}'. Type 'help'.")),
    }
}

pub async fn run(ledger: &mut ConversionLedger) -> Result<()> {
    let term = Term::stdout();
    println!(
        "{}",
        ui::style_text(
            &format!(
                "Currency exchange (reference currency {}). Type 'help' for commands.",
                ledger.reference_currency()
            ),
            ui::StyleType::Subtle
        )
    );

    loop {
        term.write_str("> ")?;
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        debug!("Prompt input: {line:?}");

        let outcome = match parse_line(&line) {
            Ok(PromptCommand::Quit) => break,
            Ok(PromptCommand::Empty) => Ok(()),
            Ok(PromptCommand::Help) => {
                println!("{HELP}");
                Ok(())
            }
            Ok(PromptCommand::History) => {
                history::run(ledger.history());
                Ok(())
            }
            Ok(PromptCommand::Stats { base, target }) => stats::run(ledger, &base, &target),
            Ok(PromptCommand::Convert {
                base,
                target,
                amount,
            }) => convert::run(ledger, &base, &target, &amount).await,
            Err(message) => {
                ui::print_error(&message);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            ui::print_error(&e.to_string());
        }
    }

    Ok(())
}
