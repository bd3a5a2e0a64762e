// src/report.rs
//! Price comparison report
//!
//! Glue between a market-data collaborator (which supplies closes, a rate,
//! dates and the contract) and the two pricers. Parameter estimation runs
//! once in [`OptionPricing::new`]; each pricer then reads the same immutable
//! [`PricingParameters`].

use crate::analytics::bs_analytic::bs_price;
use crate::config::PricerConfig;
use crate::error::{PricingError, PricingResult};
use crate::estimate::PriceEstimate;
use crate::estimation::{estimate_volatility_with, spot_from_history, years_between};
use crate::mc::mc_engine::{mc_price, SimulationConfig};
use crate::models::option::{OptionKind, PricingParameters};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Plain inputs handed over by the market-data side
#[derive(Clone, Debug, PartialEq)]
pub struct MarketInputs {
    pub ticker: String,
    /// Chronological daily closes; the last one is the spot
    pub closes: Vec<f64>,
    pub risk_free_rate: f64,
    pub as_of: NaiveDate,
    pub expiry: NaiveDate,
    pub strike: f64,
    pub option_kind: String,
    /// Last traded option price, shown for comparison only
    pub market_price: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct OptionPricing {
    ticker: String,
    params: PricingParameters,
    market_price: Option<f64>,
    simulation: SimulationConfig,
}

impl OptionPricing {
    pub fn new(inputs: &MarketInputs, config: &PricerConfig) -> PricingResult<Self> {
        let kind: OptionKind = inputs.option_kind.parse()?;
        config.simulation.validate()?;

        let volatility = estimate_volatility_with(&inputs.closes, &config.estimator)?;
        let spot = spot_from_history(&inputs.closes)?;

        let time_to_maturity = years_between(inputs.as_of, inputs.expiry);
        if time_to_maturity <= 0.0 {
            warn!(
                as_of = %inputs.as_of,
                expiry = %inputs.expiry,
                "option has already expired"
            );
            return Err(PricingError::DegenerateParameters {
                parameter: "time_to_maturity".to_string(),
                value: time_to_maturity,
                constraint: format!(
                    "expiry {} must fall after as-of date {}",
                    inputs.expiry, inputs.as_of
                ),
            });
        }

        let params = PricingParameters::new(
            spot,
            volatility,
            inputs.risk_free_rate,
            time_to_maturity,
            inputs.strike,
            kind,
        )?;

        info!(
            ticker = %inputs.ticker,
            spot,
            volatility,
            time_to_maturity,
            observations = inputs.closes.len(),
            "estimated pricing parameters"
        );

        Ok(OptionPricing {
            ticker: inputs.ticker.clone(),
            params,
            market_price: inputs.market_price,
            simulation: config.simulation.clone(),
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn parameters(&self) -> &PricingParameters {
        &self.params
    }

    pub fn monte_carlo(&self) -> PricingResult<PriceEstimate> {
        mc_price(&self.params, &self.simulation)
    }

    pub fn black_scholes(&self) -> PricingResult<PriceEstimate> {
        bs_price(&self.params)
    }

    /// Runs both pricers concurrently and assembles the report
    pub fn report(&self) -> PricingResult<PriceReport> {
        let (monte_carlo, black_scholes) =
            rayon::join(|| self.monte_carlo(), || self.black_scholes());
        let monte_carlo = monte_carlo?;
        let black_scholes = black_scholes?;

        info!(
            ticker = %self.ticker,
            monte_carlo = monte_carlo.value,
            black_scholes = black_scholes.value,
            "priced option"
        );

        Ok(PriceReport {
            ticker: self.ticker.clone(),
            kind: self.params.kind,
            strike: self.params.strike,
            spot: self.params.spot,
            volatility: self.params.volatility,
            risk_free_rate: self.params.risk_free_rate,
            time_to_maturity: self.params.time_to_maturity,
            market_price: self.market_price,
            monte_carlo,
            black_scholes,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceReport {
    pub ticker: String,
    pub kind: OptionKind,
    pub strike: f64,
    pub spot: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub time_to_maturity: f64,
    pub market_price: Option<f64>,
    pub monte_carlo: PriceEstimate,
    pub black_scholes: PriceEstimate,
}

impl fmt::Display for PriceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Option Pricing:")?;
        writeln!(f, "Option Type: {} | Strike Price: {}", self.kind, self.strike)?;
        writeln!(f, "Option name: {} | Spot Price: {:.2}", self.ticker, self.spot)?;
        match self.market_price {
            Some(price) => writeln!(f, "Market Price: {:.2}", price)?,
            None => writeln!(f, "Market Price: n/a")?,
        }
        writeln!(f, "Monte Carlo Simulation: {:.2}", self.monte_carlo.value)?;
        write!(f, "Black-Scholes Model: {:.2}", self.black_scholes.value)
    }
}
