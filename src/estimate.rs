// src/estimate.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingMethod {
    MonteCarlo,
    BlackScholes,
}

impl fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMethod::MonteCarlo => f.write_str("Monte Carlo"),
            PricingMethod::BlackScholes => f.write_str("Black-Scholes"),
        }
    }
}

/// Price produced by one pricer call
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub value: f64,
    pub method: PricingMethod,
    /// Standard error of the simulated mean; `None` for closed-form prices
    pub standard_error: Option<f64>,
    /// Trials averaged into `value`; fewer than requested after cancellation
    pub trials: Option<usize>,
}

impl PriceEstimate {
    pub fn analytic(value: f64) -> Self {
        PriceEstimate {
            value,
            method: PricingMethod::BlackScholes,
            standard_error: None,
            trials: None,
        }
    }

    pub fn simulated(value: f64, standard_error: f64, trials: usize) -> Self {
        PriceEstimate {
            value,
            method: PricingMethod::MonteCarlo,
            standard_error: Some(standard_error),
            trials: Some(trials),
        }
    }
}
