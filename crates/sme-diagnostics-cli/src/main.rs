mod commands;
mod input;
mod output;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::breakeven::BreakevenArgs;
use commands::classify::ClassifyArgs;
use commands::diagnose::DiagnoseArgs;
use commands::pricing::{PriceArgs, PriceCompareArgs};
use commands::trend::TrendArgs;
use commands::valuation::ValuationArgs;
use settings::Settings;

/// Financial diagnostics for small businesses
#[derive(Parser)]
#[command(
    name = "smed",
    version,
    about = "Financial diagnostics for small businesses",
    long_about = "Turns a handful of monthly figures into margins, cash-cycle days, \
                  break-even sales, a health verdict, a cost-plus unit price and an \
                  indicative business value, all with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Settings file (defaults to ./smed.toml when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log computation details to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full diagnosis of one period: ratios, alerts, verdict, recommendations
    Diagnose(DiagnoseArgs),
    /// Classify a single ratio against the threshold table
    Classify(ClassifyArgs),
    /// Break-even and target sales from fixed costs and contribution margin
    Breakeven(BreakevenArgs),
    /// Cost-plus price for one unit
    Price(PriceArgs),
    /// Compare saved pricing scenarios side by side
    PriceCompare(PriceCompareArgs),
    /// EBITDA-multiple business valuation
    Valuation(ValuationArgs),
    /// Multi-period trend from JSON or a CSV table
    Trend(TrendArgs),
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
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(command: Commands, settings: &Settings) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    match command {
        Commands::Diagnose(args) => commands::diagnose::run_diagnose(args, settings),
        Commands::Classify(args) => commands::classify::run_classify(args, settings),
        Commands::Breakeven(args) => commands::breakeven::run_breakeven(args),
        Commands::Price(args) => commands::pricing::run_price(args),
        Commands::PriceCompare(args) => commands::pricing::run_price_compare(args),
        Commands::Valuation(args) => commands::valuation::run_valuation(args, settings),
        Commands::Trend(args) => commands::trend::run_trend(args, settings),
        Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Version => {
            println!("smed {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        command => Settings::load(cli.config.as_deref())
            .map_err(Into::into)
            .and_then(|settings| run(command, &settings)),
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
