// src/config.rs
use crate::error::{PricingError, PricingResult};
use crate::estimation::EstimatorConfig;
use crate::mc::mc_engine::{SimulationConfig, VarianceReduction};
use std::str::FromStr;

pub const ENV_STEPS: &str = "OPTION_PRICING_STEPS";
pub const ENV_TRIALS: &str = "OPTION_PRICING_TRIALS";
pub const ENV_SEED: &str = "OPTION_PRICING_SEED";
pub const ENV_CHUNK_SIZE: &str = "OPTION_PRICING_CHUNK_SIZE";
pub const ENV_ANTITHETIC: &str = "OPTION_PRICING_ANTITHETIC";
pub const ENV_TRADING_DAYS: &str = "OPTION_PRICING_TRADING_DAYS";
pub const ENV_LOOKBACK: &str = "OPTION_PRICING_LOOKBACK";

/// Caller-tunable knobs for both pricers and the estimator
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PricerConfig {
    pub simulation: SimulationConfig,
    pub estimator: EstimatorConfig,
}

impl PricerConfig {
    /// Defaults overridden by `.env` and `OPTION_PRICING_*` variables
    pub fn from_env() -> PricingResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable lookup
    pub fn from_lookup<F>(lookup: F) -> PricingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PricerConfig::default();
        let sim = defaults.simulation;
        let est = defaults.estimator;

        let antithetic = parse_or(&lookup, ENV_ANTITHETIC, false)?;
        let lookback = match lookup(ENV_LOOKBACK) {
            None => est.lookback,
            Some(raw) => parse_lookback(&raw)?,
        };

        let config = PricerConfig {
            simulation: SimulationConfig {
                step_count: parse_or(&lookup, ENV_STEPS, sim.step_count)?,
                trial_count: parse_or(&lookup, ENV_TRIALS, sim.trial_count)?,
                seed: parse_or(&lookup, ENV_SEED, sim.seed)?,
                chunk_size: parse_or(&lookup, ENV_CHUNK_SIZE, sim.chunk_size)?,
                variance_reduction: if antithetic {
                    VarianceReduction::Antithetic
                } else {
                    VarianceReduction::None
                },
            },
            estimator: EstimatorConfig {
                trading_days_per_year: parse_or(
                    &lookup,
                    ENV_TRADING_DAYS,
                    est.trading_days_per_year,
                )?,
                lookback,
            },
        };
        config.simulation.validate()?;
        Ok(config)
    }
}

/// `0` or `all` means the whole history
pub fn parse_lookback(raw: &str) -> PricingResult<Option<usize>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    match raw.parse::<usize>() {
        Ok(0) => Ok(None),
        Ok(n) => Ok(Some(n)),
        Err(e) => Err(PricingError::InvalidConfiguration {
            field: ENV_LOOKBACK.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> PricingResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| PricingError::InvalidConfiguration {
                field: key.to_string(),
                reason: format!("{e}"),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = PricerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PricerConfig::default());
        assert_eq!(config.simulation.step_count, 500);
        assert_eq!(config.simulation.trial_count, 100_000);
        assert_eq!(config.estimator.trading_days_per_year, 252);
    }

    #[test]
    fn test_overrides() {
        let config = PricerConfig::from_lookup(lookup_from(&[
            (ENV_STEPS, "1000"),
            (ENV_TRIALS, " 200000 "),
            (ENV_SEED, "7"),
            (ENV_ANTITHETIC, "true"),
            (ENV_TRADING_DAYS, "260"),
            (ENV_LOOKBACK, "all"),
        ]))
        .unwrap();

        assert_eq!(config.simulation.step_count, 1000);
        assert_eq!(config.simulation.trial_count, 200_000);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(
            config.simulation.variance_reduction,
            VarianceReduction::Antithetic
        );
        assert_eq!(config.estimator.trading_days_per_year, 260);
        assert_eq!(config.estimator.lookback, None);
    }

    #[test]
    fn test_bad_values_are_configuration_errors() {
        let err = PricerConfig::from_lookup(lookup_from(&[(ENV_TRIALS, "lots")])).unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidConfiguration { ref field, .. } if field == ENV_TRIALS
        ));

        let err = PricerConfig::from_lookup(lookup_from(&[(ENV_STEPS, "0")])).unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_parse_lookback() {
        assert_eq!(parse_lookback("0"), Ok(None));
        assert_eq!(parse_lookback("ALL"), Ok(None));
        assert_eq!(parse_lookback("126"), Ok(Some(126)));
        assert!(parse_lookback("-3").is_err());
    }
}
