//! # option-pricing: Monte Carlo and Black-Scholes for Vanilla Options
//!
//! Prices a single European call or put on an equity two independent ways:
//! a Monte Carlo simulation over geometric Brownian motion paths and the
//! closed-form Black-Scholes formula. Both read the same
//! [`PricingParameters`](models::option::PricingParameters), estimated from a
//! daily close history.
//!
//! ## Key Features
//!
//! - **Deterministic parallel Monte Carlo**: Rayon over fixed chunks with one
//!   seeded stream per chunk, bit-identical for a given seed
//! - **Swappable randomness**: pricers draw through the [`rng::NormalSource`] trait
//! - **Typed failures**: unsupported kinds, degenerate inputs and short
//!   histories are distinct [`PricingError`] variants, never sentinel prices
//! - **Parameter estimation**: annualized volatility from simple returns,
//!   Actual/365 year fractions
//!
//! ## Quick Start
//!
//! ```rust
//! use option_pricing::analytics::bs_analytic::bs_price;
//! use option_pricing::mc::mc_engine::{mc_price, SimulationConfig};
//! use option_pricing::models::option::{OptionKind, PricingParameters};
//!
//! let params = PricingParameters::new(
//!     100.0, // Spot price
//!     0.2,   // Volatility
//!     0.05,  // Risk-free rate
//!     1.0,   // Years to expiry
//!     100.0, // Strike
//!     OptionKind::Call,
//! )
//! .expect("valid parameters");
//!
//! let config = SimulationConfig {
//!     trial_count: 20_000,
//!     step_count: 50,
//!     ..Default::default()
//! };
//!
//! let mc = mc_price(&params, &config).expect("valid configuration");
//! let bs = bs_price(&params).expect("positive volatility");
//! println!("MC {:.4} ± {:.4}, BS {:.4}", mc.value, mc.standard_error.unwrap_or(0.0), bs.value);
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod estimate;
pub mod estimation;
pub mod math_utils;
pub mod mc;
pub mod models;
pub mod report;
pub mod rng;

// Re-export commonly used types for convenience
pub use error::{PricingError, PricingResult};
pub use estimate::{PriceEstimate, PricingMethod};
pub use models::option::{OptionKind, PricingParameters};
