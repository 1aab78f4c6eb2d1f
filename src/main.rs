use std::io::{self, BufRead, Write};

use clap::Parser;
use log::{info, warn};

use qrsqrt::equivalence::{EquivalenceChecker, FailurePolicy};
use qrsqrt::error::validation_error;
use qrsqrt::harness::{Harness, HarnessConfig, Method, DEFAULT_ARRAY_SIZE, DEFAULT_ITERATIONS};
use qrsqrt::simd::backends;

/// Benchmark the fast inverse square root at 1, 4 and 8 lanes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Value every input element is set to (prompted for when omitted)
    #[arg(short, long)]
    value: Option<f32>,

    /// Timed passes per method
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Elements per buffer
    #[arg(short, long, default_value_t = DEFAULT_ARRAY_SIZE)]
    size: usize,

    /// Methods to run, in order (all of them by default)
    #[arg(short, long, value_enum)]
    method: Vec<Method>,

    /// Skip the lane-width equivalence sweep
    #[arg(long)]
    skip_check: bool,

    /// Abort when the equivalence sweep finds a mismatch
    #[arg(long, conflicts_with = "skip_check")]
    strict: bool,
}

fn prompt_value() -> Result<f32, Box<dyn std::error::Error>> {
    print!("Enter a number: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let value = line
        .trim()
        .parse::<f32>()
        .map_err(|e| validation_error(format!("'{}' is not a number: {e}", line.trim())))?;
    Ok(value)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = HarnessConfig {
        iterations: args.iterations,
        array_size: args.size,
    };
    config.validate()?;

    let b = backends();
    info!(
        "backends: single = {}, narrow = {}, wide = {}",
        b.single, b.narrow, b.wide
    );

    if !args.skip_check {
        let policy = if args.strict {
            FailurePolicy::Strict
        } else {
            FailurePolicy::Observe
        };

        let report = EquivalenceChecker::new()
            .with_policy(policy)
            .run_default_sweep()?;

        if report.is_clean() {
            info!("equivalence sweep: {report}");
        } else {
            warn!("equivalence sweep: {report}");
        }
    }

    let value = match args.value {
        Some(value) => value,
        None => prompt_value()?,
    };

    let methods = if args.method.is_empty() {
        Method::ALL.to_vec()
    } else {
        args.method
    };

    let mut harness = Harness::new(config)?;
    harness.warm_cache(value)?;

    for method in methods {
        let report = harness.run_method(method, value)?;
        println!("{report}\n");
    }

    Ok(())
}
