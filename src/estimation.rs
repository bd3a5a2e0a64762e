// src/estimation.rs
//! Parameter estimation from historical market data
//!
//! Turns the raw inputs a market-data collaborator supplies (daily closes,
//! a T-bill quote, calendar dates) into the scalars [`PricingParameters`]
//! needs.
//!
//! [`PricingParameters`]: crate::models::option::PricingParameters

use crate::error::{PricingError, PricingResult};
use chrono::NaiveDate;
use statrs::statistics::Statistics;

pub const TRADING_DAYS_PER_YEAR: u32 = 252;
pub const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EstimatorConfig {
    pub trading_days_per_year: u32,
    /// Number of most recent returns to use; `None` uses the whole series
    pub lookback: Option<usize>,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            lookback: Some(TRADING_DAYS_PER_YEAR as usize),
        }
    }
}

/// Annualized volatility of day-over-day simple returns
///
/// ```text
/// r_i = (p_i - p_{i-1}) / p_{i-1}
/// σ   = stdev(r) * √tradingDaysPerYear      (sample stdev, n - 1)
/// ```
///
/// A single return has no observable dispersion and yields `0.0`, as does a
/// constant series.
pub fn estimate_volatility(prices: &[f64], trading_days_per_year: u32) -> PricingResult<f64> {
    if prices.len() < 2 {
        return Err(PricingError::InsufficientData {
            required: 2,
            actual: prices.len(),
        });
    }
    if trading_days_per_year == 0 {
        return Err(PricingError::InvalidConfiguration {
            field: "trading_days_per_year".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    if let Some(&bad) = prices.iter().find(|p| !(**p > 0.0) || !p.is_finite()) {
        return Err(PricingError::DegenerateParameters {
            parameter: "price_series".to_string(),
            value: bad,
            constraint: "every price must be positive and finite".to_string(),
        });
    }

    let returns: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    if returns.len() < 2 || returns.iter().all(|&r| r == returns[0]) {
        return Ok(0.0);
    }

    let daily = returns.iter().std_dev();
    Ok(daily * (trading_days_per_year as f64).sqrt())
}

/// [`estimate_volatility`] over the configured lookback window
pub fn estimate_volatility_with(prices: &[f64], config: &EstimatorConfig) -> PricingResult<f64> {
    estimate_volatility(lookback_window(prices, config.lookback), config.trading_days_per_year)
}

/// Last `lookback` returns need `lookback + 1` closes
fn lookback_window(prices: &[f64], lookback: Option<usize>) -> &[f64] {
    match lookback {
        Some(n) if prices.len() > n + 1 => &prices[prices.len() - (n + 1)..],
        _ => prices,
    }
}

/// Year fraction between two dates on an Actual/365 basis
///
/// Negative when `end` precedes `start`; callers reject non-positive values
/// before building pricing parameters.
pub fn years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / DAYS_PER_YEAR
}

/// Spot price: the latest close of a chronological series
pub fn spot_from_history(prices: &[f64]) -> PricingResult<f64> {
    prices
        .last()
        .copied()
        .ok_or(PricingError::InsufficientData {
            required: 1,
            actual: 0,
        })
}

/// Converts a 13-week T-bill index quote (percent) to a decimal rate
pub fn rate_from_tbill_quote(quote_percent: f64) -> f64 {
    quote_percent / 100.0
}
