// src/error.rs
use thiserror::Error;

/// Error types for the option-pricing library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Option kind outside {Call, Put}
    #[error("Unsupported option kind '{kind}': expected 'Call' or 'Put'")]
    UnsupportedOptionKind { kind: String },

    /// Parameter value that makes pricing undefined
    #[error("Degenerate parameter '{parameter}' = {value}: {constraint}")]
    DegenerateParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Not enough historical observations
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Invalid configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Non-finite or otherwise unusable numerical result
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },

    /// Simulation cancelled before any trial completed
    #[error("Simulation cancelled after {completed} completed trials")]
    Cancelled { completed: usize },
}

/// Result type alias for option-pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Validation utilities
pub mod validation {
    use super::{PricingError, PricingResult};

    /// Upper bound on trials per run
    pub const MAX_TRIALS: usize = 1_000_000_000;

    /// Upper bound on time steps per path
    pub const MAX_STEPS: usize = 100_000;

    fn degenerate(name: &str, value: f64, constraint: &str) -> PricingError {
        PricingError::DegenerateParameters {
            parameter: name.to_string(),
            value,
            constraint: constraint.to_string(),
        }
    }

    /// Validate that a parameter is finite and positive
    pub fn validate_positive(name: &str, value: f64) -> PricingResult<()> {
        // NaN fails this comparison too
        if !(value > 0.0) || !value.is_finite() {
            Err(degenerate(name, value, "must be positive (> 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is finite and non-negative
    pub fn validate_non_negative(name: &str, value: f64) -> PricingResult<()> {
        if !(value >= 0.0) || !value.is_finite() {
            Err(degenerate(name, value, "must be non-negative (≥ 0)"))
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PricingResult<()> {
        if !value.is_finite() {
            Err(degenerate(name, value, "must be finite (not NaN or infinite)"))
        } else {
            Ok(())
        }
    }

    /// Validate trial count
    pub fn validate_trials(trials: usize) -> PricingResult<()> {
        if trials == 0 {
            Err(PricingError::InvalidConfiguration {
                field: "trial_count".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if trials > MAX_TRIALS {
            Err(PricingError::InvalidConfiguration {
                field: "trial_count".to_string(),
                reason: "exceeds maximum allowed (1 billion)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate steps count
    pub fn validate_steps(steps: usize) -> PricingResult<()> {
        if steps == 0 {
            Err(PricingError::InvalidConfiguration {
                field: "step_count".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else if steps > MAX_STEPS {
            Err(PricingError::InvalidConfiguration {
                field: "step_count".to_string(),
                reason: "exceeds maximum allowed (100,000)".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
