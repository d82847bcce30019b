mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::ledger::ApplyLedgerArgs;
use commands::payoff::{EarlyPayoffArgs, PayoffAtArgs};
use commands::schedule::ScheduleArgs;

/// Installment-loan schedules and early payoff quotes
#[derive(Parser)]
#[command(
    name = "installment",
    version,
    about = "Installment-loan amortization schedules with decimal precision",
    long_about = "Generates deterministic month-by-month installment schedules from a \
                  purchase sum, term, annual rate and down payment, quotes early payoff \
                  amounts, and projects recorded payments onto a stored schedule."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a month-by-month payment schedule
    Schedule(ScheduleArgs),
    /// Quote the amount due to settle a balance now
    EarlyPayoff(EarlyPayoffArgs),
    /// Generate a schedule and quote payoff after a given month
    PayoffAt(PayoffAtArgs),
    /// Project a payment ledger onto a stored schedule
    ApplyLedger(ApplyLedgerArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::EarlyPayoff(args) => commands::payoff::run_early_payoff(args),
        Commands::PayoffAt(args) => commands::payoff::run_payoff_at(args),
        Commands::ApplyLedger(args) => commands::ledger::run_apply_ledger(args),
        Commands::Version => {
            println!("installment {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
