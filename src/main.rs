use analytics::{StrategyEvaluationRequest, StrategyEvaluator};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use configuration::Config;
use core_types::{OptionAction, OptionType, ScreeningFilters, StrategyLeg};
use market_data::{PriceResolver, SYNTHETIC_CAVEAT};
use rust_decimal::Decimal;
use screener::{ChainQuery, ScreeningService};
use std::str::FromStr;

mod render;

/// The main entry point for the Optilab options analytics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = configuration::load_config()?;
    let _log_guard = configuration::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config, PriceResolver::synthetic()).await
        }
        Commands::Screen(args) => handle_screen(&config, args),
        Commands::Chain(args) => handle_chain(&config, args),
        Commands::Evaluate(args) => handle_evaluate(&config, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Synthetic option chains, contract screening and multi-leg strategy analysis.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Screen option contracts across one or more underlyings.
    Screen(ScreenArgs),
    /// Print the full chain of one underlying, grouped by expiration.
    Chain(ChainArgs),
    /// Evaluate a multi-leg strategy over a price sweep.
    Evaluate(EvaluateArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,
    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args)]
struct ScreenArgs {
    /// Underlying symbols, comma separated (e.g., "SPY,QQQ").
    #[arg(long, value_delimiter = ',', required = true)]
    symbols: Vec<String>,
    #[arg(long, default_value_t = 0)]
    min_dte: u32,
    #[arg(long, default_value_t = 60)]
    max_dte: u32,
    /// Raw signed delta; use negative bounds for puts.
    #[arg(long, allow_negative_numbers = true)]
    min_delta: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    max_delta: Option<f64>,
    #[arg(long, default_value_t = 0)]
    min_volume: u64,
    #[arg(long, default_value_t = 0)]
    min_open_interest: u64,
    /// "call", "put" or both, comma separated.
    #[arg(long = "types", value_delimiter = ',')]
    option_types: Vec<OptionType>,
    #[arg(long, default_value_t = 50)]
    limit: usize,
    #[command(flatten)]
    generation: GenerationArgs,
    /// Print the response as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ChainArgs {
    #[arg(long)]
    symbol: String,
    #[arg(long, default_value_t = 0)]
    min_dte: u32,
    #[arg(long, default_value_t = 60)]
    max_dte: u32,
    #[arg(long = "types", value_delimiter = ',')]
    option_types: Vec<OptionType>,
    #[command(flatten)]
    generation: GenerationArgs,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct GenerationArgs {
    /// Overrides `engine.seed` for synthetic liquidity.
    #[arg(long)]
    seed: Option<u64>,
    /// Treat this date as today (format: YYYY-MM-DD).
    #[arg(long)]
    as_of: Option<NaiveDate>,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Current underlying price.
    #[arg(long)]
    price: Decimal,
    /// A leg as action:type:strike:premium[:quantity], e.g. "buy:call:100:5".
    #[arg(long = "leg", required = true, value_parser = parse_leg)]
    legs: Vec<StrategyLeg>,
    /// Half-width of the price sweep as a fraction of spot.
    #[arg(long)]
    range: Option<Decimal>,
    #[arg(long)]
    points: Option<usize>,
    /// Underlying whose volatility seeds the Greeks snapshot.
    #[arg(long)]
    symbol: Option<String>,
    #[arg(long)]
    volatility: Option<f64>,
    #[arg(long)]
    dte: Option<u32>,
    #[arg(long)]
    json: bool,
}

fn parse_leg(s: &str) -> Result<StrategyLeg, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [action, option_type, strike, premium, rest @ ..] = parts.as_slice() else {
        return Err(format!("expected action:type:strike:premium[:quantity], got '{}'", s));
    };
    let quantity = match rest {
        [] => 1,
        [quantity] => quantity.parse::<u32>().map_err(|e| format!("quantity: {}", e))?,
        _ => return Err(format!("too many fields in '{}'", s)),
    };
    Ok(StrategyLeg {
        action: OptionAction::from_str(action).map_err(|e| e.to_string())?,
        option_type: OptionType::from_str(option_type).map_err(|e| e.to_string())?,
        strike_price: Decimal::from_str(strike).map_err(|e| format!("strike: {}", e))?,
        premium: Decimal::from_str(premium).map_err(|e| format!("premium: {}", e))?,
        quantity,
    })
}

fn types_or_all(types: Vec<OptionType>) -> Vec<OptionType> {
    if types.is_empty() { OptionType::all() } else { types }
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_screen(config: &Config, args: ScreenArgs) -> anyhow::Result<()> {
    let service = ScreeningService::new(config, PriceResolver::synthetic())?;
    let filters = ScreeningFilters {
        underlying_symbols: args.symbols,
        min_dte: args.min_dte,
        max_dte: args.max_dte,
        min_delta: args.min_delta,
        max_delta: args.max_delta,
        min_volume: args.min_volume,
        min_open_interest: args.min_open_interest,
        option_types: types_or_all(args.option_types),
        result_limit: args.limit,
        seed: args.generation.seed,
        as_of: args.generation.as_of,
    };
    let outcome = service.screen(&filters)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    println!("{}", render::contracts_table(&outcome.contracts));
    println!(
        "Showing {} of {} matching contracts.",
        outcome.contracts.len(),
        outcome.total_match_count
    );
    if outcome.is_synthetic() {
        println!("{}", SYNTHETIC_CAVEAT);
    }
    Ok(())
}

fn handle_chain(config: &Config, args: ChainArgs) -> anyhow::Result<()> {
    let service = ScreeningService::new(config, PriceResolver::synthetic())?;
    let query = ChainQuery {
        underlying_symbol: args.symbol,
        min_dte: args.min_dte,
        max_dte: args.max_dte,
        option_types: types_or_all(args.option_types),
        seed: args.generation.seed,
        as_of: args.generation.as_of,
    };
    let chain = service.chain(&query)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&chain)?);
        return Ok(());
    }
    println!(
        "{} @ {} (IV seed {:.2}%)",
        chain.underlying.symbol,
        chain.underlying.price,
        chain.underlying.iv_seed * 100.0
    );
    for slice in &chain.expirations {
        println!("\n{} ({} DTE)", slice.expiration_date, slice.days_to_expiration);
        println!("{}", render::contracts_table(&slice.contracts));
    }
    if chain.underlying.origin.is_synthetic() {
        println!("\n{}", SYNTHETIC_CAVEAT);
    }
    Ok(())
}

fn handle_evaluate(config: &Config, args: EvaluateArgs) -> anyhow::Result<()> {
    let evaluator = StrategyEvaluator::from_config(config)?;
    let request = StrategyEvaluationRequest {
        underlying_price: args.price,
        legs: args.legs,
        price_range_percent: args.range,
        num_points: args.points,
        underlying_symbol: args.symbol,
        volatility: args.volatility,
        days_to_expiration: args.dte,
    };
    let volatility = evaluator.snapshot_volatility(&request, &PriceResolver::synthetic())?;
    let result = evaluator.evaluate(&request, volatility.value)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    println!("{}", render::strategy_summary(&result));
    println!("{}", render::pnl_table(&result, config.strategy.greeks_sample_stride));
    if volatility.synthetic {
        println!("Greeks use a fallback volatility of {:.2}%. {}", volatility.value * 100.0, SYNTHETIC_CAVEAT);
    }
    Ok(())
}
