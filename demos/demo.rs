// demos/demo.rs
use anyhow::Context;
use chrono::NaiveDate;
use option_pricing::analytics::bs_analytic::bs_price;
use option_pricing::config::PricerConfig;
use option_pricing::math_utils::Timer;
use option_pricing::mc::mc_engine::{mc_price, SimulationConfig};
use option_pricing::models::gbm::{generate_path, PathParams};
use option_pricing::models::option::{OptionKind, PricingParameters};
use option_pricing::report::{MarketInputs, OptionPricing};
use option_pricing::rng::SeededNormal;

fn main() -> anyhow::Result<()> {
    println!("option-pricing demo");
    println!("===================\n");

    // Synthetic one-year history with ~25% annualized volatility
    let path_params = PathParams {
        risk_free_rate: 0.08,
        volatility: 0.25,
        step_interval: 1.0 / 252.0,
    };
    let history = generate_path(&path_params, 140.0, 252, &mut SeededNormal::new(2024));

    let inputs = MarketInputs {
        ticker: "DEMO".to_string(),
        closes: history.into_inner(),
        risk_free_rate: 0.0525,
        as_of: NaiveDate::from_ymd_opt(2024, 1, 2).context("as-of date")?,
        expiry: NaiveDate::from_ymd_opt(2024, 6, 21).context("expiry date")?,
        strike: 150.0,
        option_kind: "Call".to_string(),
        market_price: None,
    };

    let mut timer = Timer::new();
    timer.start();
    let report = OptionPricing::new(&inputs, &PricerConfig::default())?.report()?;
    println!("{}", report);
    println!(
        "\n(volatility {:.4}, T {:.4}y, MC std err {:.4}, {:.1} ms)\n",
        report.volatility,
        report.time_to_maturity,
        report.monte_carlo.standard_error.unwrap_or(0.0),
        timer.elapsed_ms()
    );

    println!("Convergence for the textbook ATM call (BS ≈ 10.45):");
    let params = PricingParameters::new(100.0, 0.2, 0.05, 1.0, 100.0, OptionKind::Call)?;
    let analytic = bs_price(&params)?.value;
    for trials in [1_000, 10_000, 100_000] {
        let cfg = SimulationConfig {
            trial_count: trials,
            step_count: 100,
            ..Default::default()
        };
        let estimate = mc_price(&params, &cfg)?;
        println!(
            "  {:>7} trials: {:.4} ± {:.4} (error {:+.4})",
            trials,
            estimate.value,
            estimate.standard_error.unwrap_or(0.0),
            estimate.value - analytic
        );
    }

    let put = bs_price(&params.with_kind(OptionKind::Put))?.value;
    println!(
        "\nPut-call parity: C - P = {:.6}, S - K e^(-rT) = {:.6}",
        analytic - put,
        params.spot - params.strike * params.discount_factor()
    );
    Ok(())
}
