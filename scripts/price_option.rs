// scripts/price_option.rs
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use option_pricing::config::{parse_lookback, PricerConfig};
use option_pricing::estimation::rate_from_tbill_quote;
use option_pricing::mc::mc_engine::VarianceReduction;
use option_pricing::report::{MarketInputs, OptionPricing};
use std::path::{Path, PathBuf};

/// Price a vanilla option by Monte Carlo and Black-Scholes and compare
/// with the quoted market price
#[derive(Debug, Parser)]
#[command(name = "price-option", version)]
struct Args {
    /// Underlying ticker, used for labelling only
    #[arg(long)]
    ticker: String,

    /// Option kind: Call or Put
    #[arg(long)]
    kind: String,

    #[arg(long)]
    strike: f64,

    /// Expiry date (YYYY-MM-DD)
    #[arg(long)]
    expiry: NaiveDate,

    /// Valuation date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// File of chronological daily closes, one per line; a trailing
    /// comma-separated column is taken as the close
    #[arg(long)]
    history: PathBuf,

    /// Risk-free rate as a decimal (0.05 = 5%)
    #[arg(long, conflicts_with = "tbill_quote")]
    rate: Option<f64>,

    /// 13-week T-bill index quote in percent, converted to a decimal rate
    #[arg(long)]
    tbill_quote: Option<f64>,

    /// Last traded option price for comparison
    #[arg(long)]
    market_price: Option<f64>,

    #[arg(long)]
    steps: Option<usize>,

    #[arg(long)]
    trials: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Pair every path with its mirror image
    #[arg(long)]
    antithetic: bool,

    #[arg(long)]
    trading_days: Option<u32>,

    /// Returns used for volatility; 0 or "all" uses the whole file
    #[arg(long)]
    lookback: Option<String>,

    /// Worker threads, defaults to the number of CPUs
    #[arg(long)]
    threads: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let threads = args.threads.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("configuring worker pool")?;

    let config = build_config(&args)?;

    let risk_free_rate = match (args.rate, args.tbill_quote) {
        (Some(rate), _) => rate,
        (None, Some(quote)) => rate_from_tbill_quote(quote),
        (None, None) => bail!("one of --rate or --tbill-quote is required"),
    };

    let inputs = MarketInputs {
        ticker: args.ticker.clone(),
        closes: read_closes(&args.history)?,
        risk_free_rate,
        as_of: args
            .as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
        expiry: args.expiry,
        strike: args.strike,
        option_kind: args.kind.clone(),
        market_price: args.market_price,
    };

    let report = OptionPricing::new(&inputs, &config)
        .context("estimating pricing parameters")?
        .report()
        .context("pricing option")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}

/// Environment first, then command-line overrides
fn build_config(args: &Args) -> Result<PricerConfig> {
    let mut config = PricerConfig::from_env().context("reading OPTION_PRICING_* settings")?;

    if let Some(steps) = args.steps {
        config.simulation.step_count = steps;
    }
    if let Some(trials) = args.trials {
        config.simulation.trial_count = trials;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if args.antithetic {
        config.simulation.variance_reduction = VarianceReduction::Antithetic;
    }
    if let Some(days) = args.trading_days {
        config.estimator.trading_days_per_year = days;
    }
    if let Some(raw) = &args.lookback {
        config.estimator.lookback = parse_lookback(raw)?;
    }
    config.simulation.validate()?;
    Ok(config)
}

fn read_closes(path: &Path) -> Result<Vec<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading price history {}", path.display()))?;

    let mut closes = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let field = line.rsplit(',').next().unwrap_or(line).trim();
        match field.parse::<f64>() {
            Ok(close) => closes.push(close),
            // header row
            Err(_) if closes.is_empty() && line_no == 0 => continue,
            Err(e) => bail!("{}:{}: bad close '{}': {}", path.display(), line_no + 1, field, e),
        }
    }
    Ok(closes)
}
