mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::calculators::{
    AffordabilityArgs, CompareArgs, CompareRatesArgs, CompareTermsArgs, DtiArgs, RepaymentArgs,
};
use commands::portfolio::{PaymentsArgs, PortfolioArgs};
use commands::risk::RiskArgs;

/// Loan amortization, risk scoring and payment schedules
#[derive(Parser)]
#[command(
    name = "loanbook",
    version,
    about = "Loan amortization, risk scoring and payment schedules",
    long_about = "A CLI for fixed-rate loan calculations with decimal precision. \
                  Supports repayment and affordability calculators, rate and term \
                  comparisons, heuristic risk scoring, payment-schedule generation \
                  and loan book analytics."
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
    /// Monthly payment, total interest and amortization breakdown
    Repayment(RepaymentArgs),
    /// Maximum affordable loan from income and expenses
    Affordability(AffordabilityArgs),
    /// Cost of one loan at several interest rates
    CompareRates(CompareRatesArgs),
    /// Cost of one loan over several terms
    CompareTerms(CompareTermsArgs),
    /// Combined rate and term comparison with the cheapest option of each
    Compare(CompareArgs),
    /// Debt-to-income ratio
    Dti(DtiArgs),
    /// Heuristic loan risk score and level
    Risk(RiskArgs),
    /// Generate a loan's payment schedule with simulated history
    Payments(PaymentsArgs),
    /// Analytics for a book of loans
    Portfolio(PortfolioArgs),
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

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Repayment(args) => commands::calculators::run_repayment(args),
        Commands::Affordability(args) => commands::calculators::run_affordability(args),
        Commands::CompareRates(args) => commands::calculators::run_compare_rates(args),
        Commands::CompareTerms(args) => commands::calculators::run_compare_terms(args),
        Commands::Compare(args) => commands::calculators::run_compare(args),
        Commands::Dti(args) => commands::calculators::run_dti(args),
        Commands::Risk(args) => commands::risk::run_risk(args),
        Commands::Payments(args) => commands::portfolio::run_payments(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Version => {
            println!("loanbook {}", env!("CARGO_PKG_VERSION"));
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
