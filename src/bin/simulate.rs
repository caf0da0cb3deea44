//! CLI binary for running referral tree simulation tests.
//!
//! Usage:
//!   cargo run --features simulation --bin simulate -- --seeds 0..1000
//!   cargo run --features simulation --bin simulate -- --seed 12345 --ops 10000
//!   RUST_LOG=referral_tree=debug cargo run --features simulation --bin simulate -- --seed 7

use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[path = "../../tests/simulation/mod.rs"]
#[allow(dead_code)]
mod simulation;

use simulation::{WorkloadConfig, WorkloadContext, WorkloadResult, WorkloadRunner};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return ExitCode::SUCCESS;
    }

    let options = match Options::parse(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    info!(
        seeds = %format!("{}..{}", options.seed_start, options.seed_end),
        ops = options.ops,
        max_users = options.max_users,
        "starting simulation"
    );

    let started = Instant::now();
    let mut failed = Vec::new();
    let mut total_ops = 0u64;
    let mut total_publishes = 0u64;

    for seed in options.seed_start..options.seed_end {
        let result = run_seed(seed, &options);
        total_ops += result.operations_executed;
        total_publishes += result.publishes;
        if !result.success {
            for violation in &result.violations {
                error!(seed, %violation, "seed failed");
            }
            failed.push(seed);
        }
    }

    let duration = started.elapsed();
    println!();
    println!("=== Simulation Complete ===");
    println!("Duration: {:?}", duration);
    println!("Seeds run: {}", options.seed_end - options.seed_start);
    println!("Seeds failed: {}", failed.len());
    println!("Total operations: {}", total_ops);
    println!("Total publishes: {}", total_publishes);
    let duration_secs = duration.as_secs_f64();
    if duration_secs > 0.0 {
        println!("Ops/sec: {:.0}", total_ops as f64 / duration_secs);
    }

    if let Some(first) = failed.first() {
        println!();
        println!("Failed seeds: {:?}", failed);
        println!("To reproduce a failure, run:");
        println!(
            "  cargo run --features simulation --bin simulate -- --seed {} --ops {}",
            first, options.ops
        );
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run_seed(seed: u64, options: &Options) -> WorkloadResult {
    let mut runner = WorkloadRunner::new(WorkloadConfig {
        operations_per_run: options.ops,
        max_users: options.max_users,
        enable_chaos_ops: !options.no_chaos,
    });
    let mut ctx = WorkloadContext::new(seed);
    let result = runner.run(&mut ctx);
    if result.success {
        info!(
            seed,
            ops = result.operations_executed,
            publishes = result.publishes,
            elapsed = ?result.duration,
            "seed passed"
        );
    }
    result
}

struct Options {
    seed_start: u64,
    seed_end: u64,
    ops: u64,
    max_users: usize,
    no_chaos: bool,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let defaults = WorkloadConfig::default();
        let single_seed = parse_arg(args, "--seed")
            .map(|s| s.parse::<u64>().map_err(|_| format!("invalid seed: {s}")))
            .transpose()?;
        let ops = parse_arg(args, "--ops")
            .map(|s| s.parse::<u64>().map_err(|_| format!("invalid ops: {s}")))
            .transpose()?
            .unwrap_or(defaults.operations_per_run);
        let max_users = parse_arg(args, "--max-users")
            .map(|s| s.parse::<usize>().map_err(|_| format!("invalid max users: {s}")))
            .transpose()?
            .unwrap_or(defaults.max_users);

        let (seed_start, seed_end) = if let Some(range) = parse_arg(args, "--seeds") {
            parse_seed_range(range)?
        } else if let Some(seed) = single_seed {
            (seed, seed + 1)
        } else {
            (0, 100)
        };

        Ok(Self {
            seed_start,
            seed_end,
            ops,
            max_users,
            no_chaos: args.iter().any(|a| a == "--no-chaos"),
        })
    }
}

fn parse_arg<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn parse_seed_range(s: &str) -> Result<(u64, u64), String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| "invalid seed range format, expected START..END".to_string())?;
    let start = start.parse().map_err(|_| format!("invalid seed range start: {start}"))?;
    let end = end.parse().map_err(|_| format!("invalid seed range end: {end}"))?;
    Ok((start, end))
}

fn print_usage() {
    println!("Referral Tree Simulation Testing");
    println!();
    println!("USAGE:");
    println!("  simulate [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  --seed <N>           Run single seed for debugging");
    println!("  --seeds <S..E>       Seed range (default: 0..100)");
    println!("  --ops <N>            Operations per seed (default: 1000)");
    println!("  --max-users <N>      Cap on users per run (default: 500)");
    println!("  --no-chaos           Skip chaos operations");
    println!("  --help               Show this message");
    println!();
    println!("Set RUST_LOG to control log output, e.g. RUST_LOG=referral_tree=debug");
}
