// src/models/gbm.rs
//! Geometric Brownian Motion path generation
//!
//! # Mathematical Framework
//!
//! Under the risk-neutral measure the asset follows
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//! and each step applies the log-return form
//! ```text
//! S_{i+1} = S_i * exp((r - σ²/2)Δt + σ√Δt * Z_i),   Z_i ~ N(0,1)
//! ```
//! with `Δt = T / steps`. Prices stay strictly positive whenever `S_0 > 0`.

use crate::rng::NormalSource;

/// Inputs for a single path: drift rate, volatility, and step length in years
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathParams {
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub step_interval: f64,
}

/// One simulated price path, `steps + 1` prices starting at the initial price
#[derive(Clone, Debug, PartialEq)]
pub struct PricePath(Vec<f64>);

impl PricePath {
    pub fn prices(&self) -> &[f64] {
        &self.0
    }

    pub fn initial(&self) -> f64 {
        self.0[0]
    }

    /// Last simulated price S_T
    pub fn terminal(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Per-step constants of the exact GBM update
#[derive(Clone, Copy, Debug)]
pub struct Gbm {
    drift: f64,
    diffusion: f64,
}

impl Gbm {
    pub fn new(params: &PathParams) -> Self {
        let sigma = params.volatility;
        Gbm {
            drift: (params.risk_free_rate - 0.5 * sigma * sigma) * params.step_interval,
            diffusion: sigma * params.step_interval.sqrt(),
        }
    }

    #[inline]
    pub fn exact_step(&self, s_t: f64, normal_draw: f64) -> f64 {
        s_t * (self.drift + self.diffusion * normal_draw).exp()
    }

    /// Walks `steps` steps from `s0` and returns only S_T
    #[inline]
    pub fn terminal<N: NormalSource + ?Sized>(&self, s0: f64, steps: usize, normals: &mut N) -> f64 {
        let mut s = s0;
        for _ in 0..steps {
            s = self.exact_step(s, normals.next_normal());
        }
        s
    }

    /// Walks the path and its antithetic partner (every draw negated) together
    #[inline]
    pub(crate) fn terminal_pair<N: NormalSource + ?Sized>(
        &self,
        s0: f64,
        steps: usize,
        normals: &mut N,
    ) -> (f64, f64) {
        let mut s = s0;
        let mut s_anti = s0;
        for _ in 0..steps {
            let z = normals.next_normal();
            s = self.exact_step(s, z);
            s_anti = self.exact_step(s_anti, -z);
        }
        (s, s_anti)
    }
}

/// Generate one full price path under GBM
pub fn generate_path<N: NormalSource + ?Sized>(
    params: &PathParams,
    initial_price: f64,
    steps: usize,
    normals: &mut N,
) -> PricePath {
    let model = Gbm::new(params);
    let mut path_prices = Vec::with_capacity(steps + 1);
    path_prices.push(initial_price);

    let mut current_s = initial_price;
    for _ in 0..steps {
        current_s = model.exact_step(current_s, normals.next_normal());
        path_prices.push(current_s);
    }
    PricePath(path_prices)
}

/// Terminal price of one path without storing the intermediate prices
pub fn simulate_terminal<N: NormalSource + ?Sized>(
    params: &PathParams,
    initial_price: f64,
    steps: usize,
    normals: &mut N,
) -> f64 {
    Gbm::new(params).terminal(initial_price, steps, normals)
}
