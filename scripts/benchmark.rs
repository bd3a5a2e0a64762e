// scripts/benchmark.rs
use anyhow::{Context, Result};
use clap::Parser;
use option_pricing::analytics::bs_analytic::bs_price;
use option_pricing::math_utils::Timer;
use option_pricing::mc::mc_engine::{mc_price, SimulationConfig, VarianceReduction};
use option_pricing::models::option::{OptionKind, PricingParameters};
use std::env;
use std::process::Command;

/// Monte Carlo convergence and throughput against the Black-Scholes price
#[derive(Debug, Parser)]
#[command(name = "benchmark")]
struct Args {
    /// Time steps per path
    #[arg(long, default_value_t = 500)]
    steps: usize,

    /// Base seed for the simulation streams
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Largest trial count to run
    #[arg(long, default_value_t = 1_000_000)]
    max_trials: usize,
}

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rust_version: Self::get_rust_version(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn get_rust_version() -> String {
        Command::new("rustc")
            .arg("--version")
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown Rust version".to_string())
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    trials: usize,
    time_ms: f64,
    throughput_paths_per_sec: f64,
    value: f64,
    standard_error: f64,
    analytic_value: f64,
}

impl BenchmarkResult {
    fn abs_error(&self) -> f64 {
        (self.value - self.analytic_value).abs()
    }
}

fn run_convergence_benchmarks(args: &Args) -> Result<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let trial_counts: Vec<usize> = [10_000, 100_000, 200_000, 1_000_000]
        .into_iter()
        .filter(|&n| n <= args.max_trials)
        .collect();

    let base = PricingParameters::new(100.0, 0.2, 0.05, 1.0, 100.0, OptionKind::Call)?;
    let schemes = [
        (VarianceReduction::None, "plain"),
        (VarianceReduction::Antithetic, "antithetic"),
    ];

    for kind in [OptionKind::Call, OptionKind::Put] {
        let params = base.with_kind(kind);
        let analytic = bs_price(&params)?.value;

        for &(variance_reduction, label) in &schemes {
            for &trials in &trial_counts {
                println!("Running {} {} with {} trials...", kind, label, trials);
                let cfg = SimulationConfig {
                    step_count: args.steps,
                    trial_count: trials,
                    seed: args.seed,
                    variance_reduction,
                    ..Default::default()
                };

                let mut timer = Timer::new();
                timer.start();
                let estimate = mc_price(&params, &cfg)
                    .with_context(|| format!("pricing {} {} with {} trials", kind, label, trials))?;
                let time_ms = timer.elapsed_ms();

                results.push(BenchmarkResult {
                    name: format!("ATM {} ({})", kind, label),
                    trials,
                    time_ms,
                    throughput_paths_per_sec: trials as f64 / (time_ms / 1000.0),
                    value: estimate.value,
                    standard_error: estimate.standard_error.unwrap_or(0.0),
                    analytic_value: analytic,
                });
            }
        }
    }

    Ok(results)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    println!("option-pricing Convergence Benchmark");
    println!("====================================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!("  Steps per path: {}", args.steps);
    println!();

    let results = run_convergence_benchmarks(&args)?;

    println!("\n{:=<100}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<100}", "");
    println!(
        "{:<24} {:>9} {:>12} {:>14} {:>10} {:>10} {:>10} {:>10}",
        "Benchmark", "Trials", "Time (ms)", "Paths/sec", "Value", "Std Err", "Analytic", "Abs Error"
    );
    println!("{:-<100}", "");

    for result in &results {
        println!(
            "{:<24} {:>9} {:>12.2} {:>14.0} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            result.name,
            result.trials,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.value,
            result.standard_error,
            result.analytic_value,
            result.abs_error()
        );
    }

    println!("{:=<100}", "");
    println!("\nTo reproduce these results:");
    println!("1. Use Rust version: {}", system_info.rust_version);
    println!("2. Set RUSTFLAGS: {}", system_info.rustc_flags);
    println!(
        "3. Run: cargo run --bin benchmark --release -- --steps {} --seed {}",
        args.steps, args.seed
    );
    Ok(())
}
