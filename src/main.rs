//! PaperLedger - Main Entry Point
//!
//! Command-line front end for the paper-trading ledger. Each invocation
//! builds a fresh ledger from configuration; nothing persists between runs.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use paper_ledger::api::{ApiReply, FeeCheckBody, LedgerService, Request};
use paper_ledger::config::load_config;
use paper_ledger::strategy::{GridParams, GridPlanner, Spacing};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", env = "PAPER_LEDGER_CONFIG")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (text, json); overrides the config file
    #[arg(long)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a grid plan without touching any balances
    Plan(GridArgs),
    /// Place a grid against a fresh ledger and print the trades
    Grid(GridArgs),
    /// Check whether a trade's proceeds clear the exchange fee
    FeeCheck(FeeCheckArgs),
    /// Print the configured starting balances
    Balances,
    /// Run a JSON array of requests against one ledger
    Replay {
        /// File containing `[{"op": ...}, ...]`
        file: String,
    },
}

#[derive(Args, Debug)]
struct GridArgs {
    /// Trading pair, e.g. BTCUSDC
    #[arg(long)]
    symbol: String,

    #[arg(long)]
    lower: Decimal,

    #[arg(long)]
    upper: Decimal,

    #[arg(long)]
    levels: u32,

    /// Quote amount to spread across the levels
    #[arg(long)]
    total: Decimal,

    /// linear or geometric
    #[arg(long, default_value = "linear")]
    spacing: Spacing,

    /// Comma-separated per-level weights; equal split when omitted
    #[arg(long, value_delimiter = ',')]
    weights: Option<Vec<Decimal>>,
}

impl GridArgs {
    fn into_params(self) -> GridParams {
        let params = GridParams::new(self.symbol, self.lower, self.upper, self.levels, self.total)
            .with_spacing(self.spacing);
        match self.weights {
            Some(weights) => params.with_weights(weights),
            None => params,
        }
    }
}

#[derive(Args, Debug)]
struct FeeCheckArgs {
    #[arg(long)]
    spent: Decimal,

    #[arg(long)]
    qty: Decimal,

    #[arg(long)]
    price: Decimal,

    /// Fee as a fraction of spend, e.g. 0.001
    #[arg(long)]
    fee_rate: Option<Decimal>,

    /// Fee as an absolute quote amount; wins over --fee-rate
    #[arg(long)]
    fee_amount: Option<Decimal>,

    #[arg(long)]
    min_order_value: Option<Decimal>,
}

fn init_logging(level: &str, format: &str) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(
            builder.with_file(true).with_line_number(true).finish(),
        )?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn finish(reply: ApiReply) -> Result<()> {
    print_json(&reply)?;
    if !reply.is_success() {
        bail!("request failed with status {}", reply.status);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(Some(&cli.config)).context("loading configuration")?;

    let log_level = cli.log_level.as_deref().unwrap_or(&config.settings.log_level);
    let log_format = cli.log_format.as_deref().unwrap_or(&config.settings.log_format);
    init_logging(log_level, log_format)?;

    info!("Starting PaperLedger");
    info!("Configuration file: {}", cli.config);

    let service = LedgerService::from_config(&config)?;

    match cli.command {
        Command::Plan(args) => {
            let planner = GridPlanner::new(config.ledger.max_grid_levels);
            let plan = planner.plan(&args.into_params())?;
            print_json(&plan)?;
        }
        Command::Grid(args) => {
            finish(service.create_grid(args.into_params()).await)?;
            print_json(&service.ledger().balances().await)?;
        }
        Command::FeeCheck(args) => {
            let body = FeeCheckBody {
                spent_usdc: args.spent,
                qty: args.qty,
                entry_price: args.price,
                fee_rate: args.fee_rate,
                fee_amount: args.fee_amount,
                min_order_value: args.min_order_value,
            };
            finish(service.fee_check(body).await)?;
        }
        Command::Balances => {
            finish(service.balances().await)?;
        }
        Command::Replay { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading request file {}", file))?;
            let requests: Vec<Request> =
                serde_json::from_str(&raw).with_context(|| format!("parsing {}", file))?;

            info!("Replaying {} requests", requests.len());
            for request in requests {
                let op = request.op();
                let reply = service.dispatch(request).await;
                print_json(&serde_json::json!({
                    "op": op,
                    "status": reply.status,
                    "body": reply.body,
                }))?;
            }
        }
    }

    Ok(())
}
