mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{InstallmentArgs, LoanArgs, RateChangesArgs};

/// Loan installment and amortization schedule calculations
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "Loan installment and amortization schedule calculations",
    long_about = "A CLI for computing equated monthly installments and month-by-month \
                  amortization schedules with decimal precision. Supports fixed, floating \
                  and hybrid (fixed-then-floating) rate loans."
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
    /// Calculate the level installment for a balance, rate and term
    Installment(InstallmentArgs),
    /// Build the month-by-month amortization schedule for a loan
    Schedule(LoanArgs),
    /// Schedule plus yearly breakdown, chart series and warnings
    Analyze(LoanArgs),
    /// Generate a floating rate-change timeline
    RateChanges(RateChangesArgs),
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
        Commands::Installment(args) => commands::loan::run_installment(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Analyze(args) => commands::loan::run_analyze(args),
        Commands::RateChanges(args) => commands::loan::run_rate_changes(args),
        Commands::Version => {
            println!("emi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
