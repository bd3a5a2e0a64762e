//! Option Payoff Functions
//!
//! ## European Options
//! - **Call**: max(S_T - K, 0) - right to buy at strike K
//! - **Put**: max(K - S_T, 0) - right to sell at strike K
//!
//! Both depend on the terminal price only, so the engine evaluates them on
//! S_T directly and never keeps the path around.

use crate::models::option::{OptionKind, PricingParameters};

/// Vanilla payoff with its strike
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Payoff {
    /// European call option: max(S_T - K, 0)
    EuropeanCall { k: f64 },

    /// European put option: max(K - S_T, 0)
    EuropeanPut { k: f64 },
}

impl Payoff {
    pub fn new(kind: OptionKind, k: f64) -> Self {
        match kind {
            OptionKind::Call => Payoff::EuropeanCall { k },
            OptionKind::Put => Payoff::EuropeanPut { k },
        }
    }

    pub fn from_params(params: &PricingParameters) -> Self {
        Self::new(params.kind, params.strike)
    }

    /// Payoff for a terminal price S_T
    #[inline]
    pub fn on_terminal(&self, s_t: f64) -> f64 {
        match self {
            Payoff::EuropeanCall { k } => (s_t - k).max(0.0),
            Payoff::EuropeanPut { k } => (k - s_t).max(0.0),
        }
    }
}
