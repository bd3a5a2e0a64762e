// src/mc/mc_engine.rs
use crate::error::{validation::*, PricingError, PricingResult};
use crate::estimate::PriceEstimate;
use crate::mc::payoffs::Payoff;
use crate::models::gbm::{Gbm, PathParams};
use crate::models::option::PricingParameters;
use crate::rng::{NormalSource, RngFactory};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VarianceReduction {
    /// Independent trials
    #[default]
    None,
    /// Each trial averages the payoffs of paths driven by Z and -Z
    Antithetic,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub step_count: usize,
    pub trial_count: usize,
    pub seed: u64,
    /// Trials per RNG stream in parallel runs
    pub chunk_size: usize,
    pub variance_reduction: VarianceReduction,
}

impl SimulationConfig {
    /// Validate the simulation configuration
    pub fn validate(&self) -> PricingResult<()> {
        validate_steps(self.step_count)?;
        validate_trials(self.trial_count)?;
        if self.chunk_size == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "chunk_size".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            step_count: 500,
            trial_count: 100_000,
            seed: 42,
            chunk_size: 4_096,
            variance_reduction: VarianceReduction::None,
        }
    }
}

/// Running payoff mean and squared deviations (Welford) for a batch of trials
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct TrialStats {
    trials: usize,
    mean: f64,
    m2: f64,
}

impl TrialStats {
    #[inline]
    fn push(&mut self, payoff: f64) {
        self.trials += 1;
        let delta = payoff - self.mean;
        self.mean += delta / self.trials as f64;
        self.m2 += delta * (payoff - self.mean);
    }

    /// Chan et al. pairwise combination of two batches
    fn merge(self, other: TrialStats) -> TrialStats {
        if self.trials == 0 {
            return other;
        }
        if other.trials == 0 {
            return self;
        }
        let n_a = self.trials as f64;
        let n_b = other.trials as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        TrialStats {
            trials: self.trials + other.trials,
            mean: self.mean + delta * n_b / n,
            m2: self.m2 + other.m2 + delta * delta * n_a * n_b / n,
        }
    }

    /// Unbiased sample variance; zero for fewer than two trials
    fn variance(&self) -> f64 {
        if self.trials > 1 {
            (self.m2 / (self.trials - 1) as f64).max(0.0)
        } else {
            0.0
        }
    }
}

/// Everything one trial needs, shared read-only across workers
#[derive(Clone, Copy, Debug)]
struct TrialKernel {
    model: Gbm,
    payoff: Payoff,
    s0: f64,
    steps: usize,
    antithetic: bool,
}

impl TrialKernel {
    fn new(params: &PricingParameters, cfg: &SimulationConfig) -> Self {
        let path_params = PathParams {
            risk_free_rate: params.risk_free_rate,
            volatility: params.volatility,
            step_interval: params.time_to_maturity / cfg.step_count as f64,
        };
        TrialKernel {
            model: Gbm::new(&path_params),
            payoff: Payoff::from_params(params),
            s0: params.spot,
            steps: cfg.step_count,
            antithetic: cfg.variance_reduction == VarianceReduction::Antithetic,
        }
    }

    #[inline]
    fn trial<N: NormalSource + ?Sized>(&self, normals: &mut N) -> f64 {
        if self.antithetic {
            let (s_t, s_t_anti) = self.model.terminal_pair(self.s0, self.steps, normals);
            0.5 * (self.payoff.on_terminal(s_t) + self.payoff.on_terminal(s_t_anti))
        } else {
            self.payoff
                .on_terminal(self.model.terminal(self.s0, self.steps, normals))
        }
    }

    fn run<N: NormalSource + ?Sized>(
        &self,
        trials: usize,
        normals: &mut N,
        cancel: Option<&AtomicBool>,
    ) -> TrialStats {
        let mut stats = TrialStats::default();
        for _ in 0..trials {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                break;
            }
            stats.push(self.trial(normals));
        }
        stats
    }
}

/// Monte Carlo price of a vanilla option under Geometric Brownian Motion
///
/// # Math Framework
///
/// Each trial walks `step_count` exact GBM steps of length `T / step_count`:
/// ```text
/// S_{i+1} = S_i * exp((r - σ²/2)Δt + σ√Δt * Z_i)
/// ```
/// and the price is the discounted mean payoff:
/// ```text
/// V = e^(-rT) * (1/N) Σ payoff(S_T^(n))
/// ```
///
/// # Parallelism
///
/// Trials are split into chunks of `chunk_size`; chunk `c` draws from the
/// stream seeded `seed + c`. Chunk statistics are combined in chunk order, so the
/// estimate is bit-identical for a given configuration on any thread count.
///
/// # Errors
///
/// Returns `PricingError` for:
/// - Degenerate parameters or invalid configuration (before any draw)
/// - Non-finite results
pub fn mc_price(params: &PricingParameters, cfg: &SimulationConfig) -> PricingResult<PriceEstimate> {
    run_chunked(params, cfg, None)
}

/// [`mc_price`] that stops scheduling trials once `cancel` is set
///
/// Returns the discounted average over the trials that completed; the
/// estimate's `trials` field reports how many that was.
pub fn mc_price_cancellable(
    params: &PricingParameters,
    cfg: &SimulationConfig,
    cancel: &AtomicBool,
) -> PricingResult<PriceEstimate> {
    run_chunked(params, cfg, Some(cancel))
}

/// Sequential Monte Carlo price drawing every normal from `normals`
///
/// `cfg.seed` and `cfg.chunk_size` are ignored; the caller owns randomness.
pub fn mc_price_with_source<N: NormalSource + ?Sized>(
    params: &PricingParameters,
    cfg: &SimulationConfig,
    normals: &mut N,
) -> PricingResult<PriceEstimate> {
    params.validate()?;
    cfg.validate()?;

    let kernel = TrialKernel::new(params, cfg);
    let stats = kernel.run(cfg.trial_count, normals, None);
    finish(params, cfg, stats)
}

fn run_chunked(
    params: &PricingParameters,
    cfg: &SimulationConfig,
    cancel: Option<&AtomicBool>,
) -> PricingResult<PriceEstimate> {
    params.validate()?;
    cfg.validate()?;

    let kernel = TrialKernel::new(params, cfg);
    let factory = RngFactory::new(cfg.seed);
    let chunk_size = cfg.chunk_size;
    let n_chunks = cfg.trial_count.div_ceil(chunk_size);

    debug!(
        trials = cfg.trial_count,
        steps = cfg.step_count,
        chunks = n_chunks,
        seed = cfg.seed,
        "starting monte carlo run"
    );

    let partials: Vec<TrialStats> = (0..n_chunks)
        .into_par_iter()
        .map(|c| {
            let start = c * chunk_size;
            let len = chunk_size.min(cfg.trial_count - start);
            let mut normals = factory.create_stream(c as u64);
            kernel.run(len, &mut normals, cancel)
        })
        .collect();

    let stats = partials
        .into_iter()
        .fold(TrialStats::default(), TrialStats::merge);
    finish(params, cfg, stats)
}

fn finish(
    params: &PricingParameters,
    cfg: &SimulationConfig,
    stats: TrialStats,
) -> PricingResult<PriceEstimate> {
    let n = stats.trials;
    if n == 0 {
        warn!("monte carlo run cancelled before any trial completed");
        return Err(PricingError::Cancelled { completed: 0 });
    }
    if n < cfg.trial_count {
        warn!(
            completed = n,
            requested = cfg.trial_count,
            "monte carlo run cancelled, returning partial average"
        );
    }

    let discount = params.discount_factor();
    let mean_payoff = stats.mean;
    let variance = stats.variance();

    let price = discount * mean_payoff;
    let standard_error = discount * (variance / n as f64).sqrt();

    if !price.is_finite() {
        return Err(PricingError::NumericalInstability {
            method: "Monte Carlo".to_string(),
            reason: format!("Price estimate is not finite: {}", price),
        });
    }
    if !standard_error.is_finite() {
        return Err(PricingError::NumericalInstability {
            method: "Monte Carlo".to_string(),
            reason: format!("Standard error is not finite: {}", standard_error),
        });
    }

    debug!(price, standard_error, trials = n, "monte carlo run finished");
    Ok(PriceEstimate::simulated(price, standard_error, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::PricingMethod;
    use crate::models::option::OptionKind;
    use crate::rng::{CountingSource, FixedSequence, SeededNormal};
    use approx::assert_relative_eq;

    fn atm_call() -> PricingParameters {
        PricingParameters::new(100.0, 0.2, 0.05, 1.0, 100.0, OptionKind::Call).unwrap()
    }

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            step_count: 20,
            trial_count: 10_000,
            chunk_size: 1_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let cfg = small_config();
        let first = mc_price(&atm_call(), &cfg).unwrap();
        let second = mc_price(&atm_call(), &cfg).unwrap();

        assert_eq!(first.value.to_bits(), second.value.to_bits());
        assert_eq!(first, second);
        assert_eq!(first.method, PricingMethod::MonteCarlo);
        assert_eq!(first.trials, Some(10_000));
    }

    #[test]
    fn test_result_independent_of_thread_count() {
        let cfg = small_config();
        let run_on = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| mc_price(&atm_call(), &cfg).unwrap())
        };

        assert_eq!(run_on(1).value.to_bits(), run_on(4).value.to_bits());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = mc_price(&atm_call(), &small_config()).unwrap();
        let b = mc_price(
            &atm_call(),
            &SimulationConfig {
                seed: 7,
                ..small_config()
            },
        )
        .unwrap();
        assert_ne!(a.value, b.value);
    }

    #[test]
    fn test_degenerate_parameters_fail_before_drawing() {
        let mut params = atm_call();
        params.strike = 0.0;
        let mut counting = CountingSource::new(SeededNormal::new(1));

        let err = mc_price_with_source(&params, &small_config(), &mut counting).unwrap_err();
        assert!(matches!(err, PricingError::DegenerateParameters { .. }));
        assert_eq!(counting.draws(), 0);
    }

    #[test]
    fn test_invalid_config_fails_before_drawing() {
        let mut counting = CountingSource::new(SeededNormal::new(1));
        let cfg = SimulationConfig {
            trial_count: 0,
            ..small_config()
        };

        assert!(matches!(
            mc_price_with_source(&atm_call(), &cfg, &mut counting),
            Err(PricingError::InvalidConfiguration { .. })
        ));
        assert_eq!(counting.draws(), 0);
    }

    #[test]
    fn test_draw_count_matches_trials_times_steps() {
        let cfg = SimulationConfig {
            step_count: 7,
            trial_count: 13,
            ..Default::default()
        };
        let mut counting = CountingSource::new(SeededNormal::new(3));
        mc_price_with_source(&atm_call(), &cfg, &mut counting).unwrap();
        assert_eq!(counting.draws(), 7 * 13);

        let antithetic = SimulationConfig {
            variance_reduction: VarianceReduction::Antithetic,
            ..cfg
        };
        let mut counting = CountingSource::new(SeededNormal::new(3));
        mc_price_with_source(&atm_call(), &antithetic, &mut counting).unwrap();
        assert_eq!(counting.draws(), 7 * 13);
    }

    #[test]
    fn test_zero_draws_give_discounted_forward_payoff() {
        let params = atm_call();
        let cfg = SimulationConfig {
            step_count: 50,
            trial_count: 10,
            ..Default::default()
        };
        let estimate =
            mc_price_with_source(&params, &cfg, &mut FixedSequence::zeros()).unwrap();

        // S_T = S_0 e^{(r - σ²/2)T} on every trial
        let s_t = 100.0 * (0.05f64 - 0.02).exp();
        let expected = (-0.05f64).exp() * (s_t - 100.0);
        assert_relative_eq!(estimate.value, expected, max_relative = 1e-10);
        assert!(estimate.standard_error.unwrap() < 1e-6);
    }

    #[test]
    fn test_zero_volatility_is_deterministic() {
        let mut params = atm_call();
        params.volatility = 0.0;
        let estimate = mc_price(&params, &small_config()).unwrap();

        let expected = 100.0 - 100.0 * (-0.05f64).exp();
        assert_relative_eq!(estimate.value, expected, max_relative = 1e-10);
    }

    #[test]
    fn test_pre_cancelled_run() {
        let cancel = AtomicBool::new(true);
        assert_eq!(
            mc_price_cancellable(&atm_call(), &small_config(), &cancel),
            Err(PricingError::Cancelled { completed: 0 })
        );
    }

    #[test]
    fn test_uncancelled_run_matches_plain_run() {
        let cancel = AtomicBool::new(false);
        let cfg = small_config();
        let plain = mc_price(&atm_call(), &cfg).unwrap();
        let cancellable = mc_price_cancellable(&atm_call(), &cfg, &cancel).unwrap();
        assert_eq!(plain, cancellable);
    }

    #[test]
    fn test_trial_stats_merge() {
        let mut a = TrialStats::default();
        a.push(1.0);
        a.push(3.0);
        let mut b = TrialStats::default();
        b.push(2.0);
        b.push(6.0);

        let merged = a.merge(b);
        assert_eq!(merged.trials, 4);
        assert_relative_eq!(merged.mean, 3.0);
        // deviations -2, 0, -1, 3
        assert_relative_eq!(merged.m2, 14.0, max_relative = 1e-12);
        assert_relative_eq!(merged.variance(), 14.0 / 3.0, max_relative = 1e-12);

        assert_eq!(TrialStats::default().merge(a), a);
        assert_eq!(a.merge(TrialStats::default()), a);
    }

    #[test]
    fn test_deep_in_the_money_zero_volatility() {
        for (spot, strike) in [(1_000.0, 10.0), (5_000.0, 100.0), (20_000.0, 100.0)] {
            let params =
                PricingParameters::new(spot, 0.0, 0.05, 1.0, strike, OptionKind::Call).unwrap();
            let cfg = SimulationConfig {
                step_count: 10,
                trial_count: 100_000,
                ..Default::default()
            };

            let estimate = mc_price(&params, &cfg).unwrap();
            let expected = spot - strike * (-0.05f64).exp();
            assert_relative_eq!(estimate.value, expected, max_relative = 1e-10);
            assert_eq!(estimate.standard_error, Some(0.0));
        }
    }

    /// Raises the cancel flag once a fixed number of normals has been drawn
    struct TripAfter<'a, N> {
        inner: N,
        remaining: usize,
        flag: &'a AtomicBool,
    }

    impl<N: NormalSource> NormalSource for TripAfter<'_, N> {
        fn next_normal(&mut self) -> f64 {
            if self.remaining == 0 {
                self.flag.store(true, Ordering::Relaxed);
            } else {
                self.remaining -= 1;
            }
            self.inner.next_normal()
        }
    }

    #[test]
    fn test_cancel_mid_run_returns_partial_average() {
        let cfg = SimulationConfig {
            step_count: 10,
            trial_count: 1_000,
            ..Default::default()
        };
        let params = atm_call();
        let kernel = TrialKernel::new(&params, &cfg);
        let cancel = AtomicBool::new(false);

        // flag goes up during the 6th trial, which still completes
        let mut normals = TripAfter {
            inner: SeededNormal::new(9),
            remaining: 55,
            flag: &cancel,
        };
        let stats = kernel.run(cfg.trial_count, &mut normals, Some(&cancel));
        assert_eq!(stats.trials, 6);

        let estimate = finish(&params, &cfg, stats).unwrap();
        assert_eq!(estimate.trials, Some(6));
        assert!(estimate.value.is_finite());

        // same six trials replayed without cancellation
        let mut replay = SeededNormal::new(9);
        let payoffs: Vec<f64> = (0..6).map(|_| kernel.trial(&mut replay)).collect();
        let mean = payoffs.iter().sum::<f64>() / 6.0;
        assert_relative_eq!(
            estimate.value,
            params.discount_factor() * mean,
            max_relative = 1e-12
        );
    }
}
