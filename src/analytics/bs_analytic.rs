// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes formulas for European options
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model, the underlying asset follows:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//!
//! The risk-neutral pricing formula gives:
//! ```text
//! V(S,t) = e^(-r(T-t)) * E^Q[payoff(S_T) | S_t = S]
//! ```
//!
//! For European options, this has closed-form solutions involving
//! the cumulative normal distribution function Φ(x).

use crate::error::{validation::*, PricingResult};
use crate::estimate::PriceEstimate;
use crate::math_utils::norm_cdf;
use crate::models::option::{OptionKind, PricingParameters};

#[inline]
fn d1_d2(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> (f64, f64) {
    let sigma_sqrt_t = sigma * t.sqrt();
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / sigma_sqrt_t;
    (d1, d1 - sigma_sqrt_t)
}

/// Black-Scholes European call option price
///
/// # Formula
/// ```text
/// C(S,K,r,σ,T) = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// ```
///
/// Where:
/// ```text
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
///
/// # Parameters
/// - `s`: Current stock price
/// - `k`: Strike price
/// - `r`: Risk-free rate
/// - `sigma`: Volatility
/// - `t`: Time to expiration
///
/// Inputs are not validated; use [`bs_price`] at API boundaries.
pub fn bs_call_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    s * norm_cdf(d1) - k * (-r * t).exp() * norm_cdf(d2)
}

/// Black-Scholes European put option price
///
/// # Formula
/// ```text
/// P(S,K,r,σ,T) = K*e^(-rT)*Φ(-d₂) - S*Φ(-d₁)
/// ```
pub fn bs_put_price(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    k * (-r * t).exp() * norm_cdf(-d2) - s * norm_cdf(-d1)
}

/// Closed-form price for validated parameters
///
/// # Errors
///
/// `DegenerateParameters` when volatility or time to maturity is not
/// strictly positive (d₁ divides by σ√T), or any other field is invalid.
pub fn bs_price(params: &PricingParameters) -> PricingResult<PriceEstimate> {
    params.validate()?;
    validate_positive("volatility", params.volatility)?;

    let PricingParameters {
        spot: s,
        volatility: sigma,
        risk_free_rate: r,
        time_to_maturity: t,
        strike: k,
        kind,
    } = *params;

    let value = match kind {
        OptionKind::Call => bs_call_price(s, k, r, sigma, t),
        OptionKind::Put => bs_put_price(s, k, r, sigma, t),
    };
    Ok(PriceEstimate::analytic(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PricingError;
    use crate::estimate::PricingMethod;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reference_call_and_put() {
        let call = bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0);
        let put = bs_put_price(100.0, 100.0, 0.05, 0.2, 1.0);

        assert_abs_diff_eq!(call, 10.450_583_572_185_565, epsilon = 1e-9);
        assert_abs_diff_eq!(put, 5.573_526_022_256_971, epsilon = 1e-9);
    }

    #[test]
    fn test_bs_price_dispatches_on_kind() {
        let call = PricingParameters::new(100.0, 0.2, 0.05, 1.0, 100.0, OptionKind::Call).unwrap();

        let call_estimate = bs_price(&call).unwrap();
        let put_estimate = bs_price(&call.with_kind(OptionKind::Put)).unwrap();

        assert_eq!(call_estimate.method, PricingMethod::BlackScholes);
        assert_eq!(call_estimate.standard_error, None);
        assert_eq!(call_estimate.value, bs_call_price(100.0, 100.0, 0.05, 0.2, 1.0));
        assert_eq!(put_estimate.value, bs_put_price(100.0, 100.0, 0.05, 0.2, 1.0));
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut params =
            PricingParameters::new(100.0, 0.2, 0.05, 1.0, 100.0, OptionKind::Call).unwrap();

        params.volatility = 0.0;
        assert!(matches!(
            bs_price(&params),
            Err(PricingError::DegenerateParameters { ref parameter, .. }) if parameter == "volatility"
        ));

        params.volatility = 0.2;
        params.time_to_maturity = 0.0;
        assert!(matches!(
            bs_price(&params),
            Err(PricingError::DegenerateParameters { ref parameter, .. }) if parameter == "time_to_maturity"
        ));

        params.time_to_maturity = 1.0;
        params.strike = -5.0;
        assert!(matches!(
            bs_price(&params),
            Err(PricingError::DegenerateParameters { .. })
        ));
    }
}
