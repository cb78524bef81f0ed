mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::debt::{AmortizeArgs, InstallmentArgs, OverviewArgs};
use commands::goals::GoalArgs;

/// Debt amortization and budgeting calculations
#[derive(Parser)]
#[command(
    name = "trezo",
    version,
    about = "Debt amortization and budgeting calculations",
    long_about = "A CLI over the Trézo engine with decimal precision. Builds \
                  constant-payment amortization schedules, summarizes several \
                  debts, and tracks savings goals."
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
    /// Build a full amortization schedule for one debt
    Amortize(AmortizeArgs),
    /// Compute the fixed periodic installment only
    Installment(InstallmentArgs),
    /// Summarize several debts as of a date
    DebtOverview(OverviewArgs),
    /// Progress towards a savings goal
    GoalProgress(GoalArgs),
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

/// Log to stderr so stdout stays machine-readable. Level comes from `TREZO_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("TREZO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::debt::run_amortize(args),
        Commands::Installment(args) => commands::debt::run_installment(args),
        Commands::DebtOverview(args) => commands::debt::run_overview(args),
        Commands::GoalProgress(args) => commands::goals::run_goal_progress(args),
        Commands::Version => {
            println!("trezo {}", env!("CARGO_PKG_VERSION"));
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
