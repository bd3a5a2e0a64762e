// src/models/option.rs
//! Vanilla option contract and the model parameters both pricers consume.

use crate::error::{validation::*, PricingError, PricingResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    Call,
    Put,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => f.write_str("Call"),
            OptionKind::Put => f.write_str("Put"),
        }
    }
}

impl FromStr for OptionKind {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionKind::Call),
            "put" | "p" => Ok(OptionKind::Put),
            _ => Err(PricingError::UnsupportedOptionKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// Model inputs for pricing one vanilla option
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricingParameters {
    pub spot: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
    pub time_to_maturity: f64, // years
    pub strike: f64,
    pub kind: OptionKind,
}

impl PricingParameters {
    pub fn new(
        spot: f64,
        volatility: f64,
        risk_free_rate: f64,
        time_to_maturity: f64,
        strike: f64,
        kind: OptionKind,
    ) -> PricingResult<Self> {
        let params = Self {
            spot,
            volatility,
            risk_free_rate,
            time_to_maturity,
            strike,
            kind,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks every field; both pricers call this before doing any work.
    pub fn validate(&self) -> PricingResult<()> {
        validate_positive("spot", self.spot)?;
        validate_non_negative("volatility", self.volatility)?;
        validate_finite("risk_free_rate", self.risk_free_rate)?;
        validate_positive("time_to_maturity", self.time_to_maturity)?;
        validate_positive("strike", self.strike)?;
        Ok(())
    }

    /// Same contract with the other option kind
    pub fn with_kind(&self, kind: OptionKind) -> Self {
        Self { kind, ..*self }
    }

    /// Discount factor e^(-rT)
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.time_to_maturity).exp()
    }
}
