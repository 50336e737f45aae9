mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::demo::DemoArgs;
use commands::var::{HistoricalArgs, MonteCarloArgs, ParametricArgs, SummaryArgs};

/// Single-portfolio Value-at-Risk estimation
#[derive(Parser)]
#[command(
    name = "pvar",
    version,
    about = "Single-portfolio Value-at-Risk estimation",
    long_about = "Estimate the Value-at-Risk of one portfolio by historical simulation, \
                  the variance-covariance (parametric) method and Monte Carlo simulation, \
                  or all three at once."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log estimator details to stderr (overrides RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Historical-simulation VaR from a sample of daily returns
    Historical(HistoricalArgs),
    /// Variance-covariance (parametric) VaR
    Parametric(ParametricArgs),
    /// Monte Carlo VaR from simulated normal returns
    MonteCarlo(MonteCarloArgs),
    /// All three methods at one confidence level
    Summary(SummaryArgs),
    /// Summary for a sample portfolio with a synthetic return history
    Demo(DemoArgs),
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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Historical(args) => commands::var::run_historical(args),
        Commands::Parametric(args) => commands::var::run_parametric(args),
        Commands::MonteCarlo(args) => commands::var::run_monte_carlo(args),
        Commands::Summary(args) => commands::var::run_summary(args),
        Commands::Demo(args) => match commands::demo::run_demo(args) {
            Ok(report) => {
                println!("{report}");
                return;
            }
            Err(e) => Err(e),
        },
        Commands::Version => {
            println!("pvar {}", env!("CARGO_PKG_VERSION"));
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
