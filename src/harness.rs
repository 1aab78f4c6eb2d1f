//! Timing harness for the three rsqrt methods.
//!
//! A run fills the input buffer with one value, times a full pass of the
//! chosen method over it, and repeats that for the configured number of
//! iterations. Filling is not part of the measured time.

use std::fmt;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use log::{debug, info};

use crate::{
    error::{config_error, validation_error, Result},
    slice::rsqrt_into,
    utils::{AlignedBuffer, BUFFER_ALIGNMENT},
};

/// Default number of timed passes per method.
pub const DEFAULT_ITERATIONS: usize = 20;

/// Default number of elements in each buffer.
pub const DEFAULT_ARRAY_SIZE: usize = 50_000_000;

/// The benchmarked ways of filling the output buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Method {
    /// Scalar bit-hack, one element at a time.
    Original,
    /// One element at a time through lane 0 of a 4-lane register.
    SingleDataSimd,
    /// Eight elements per step.
    MultipleDataSimd,
}

impl Method {
    /// Every method, in report order.
    pub const ALL: [Method; 3] = [
        Method::Original,
        Method::SingleDataSimd,
        Method::MultipleDataSimd,
    ];

    /// Name used in reports.
    pub fn name(self) -> &'static str {
        match self {
            Method::Original => "Original",
            Method::SingleDataSimd => "Improved Single Data SIMD",
            Method::MultipleDataSimd => "Improved Multiple Data SIMD",
        }
    }

    /// Runs this method over `input`, writing into `output`.
    pub fn apply(self, input: &[f32], output: &mut [f32]) -> Result<()> {
        rsqrt_into(self, input, output)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iteration count and buffer size for a benchmark run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    pub iterations: usize,
    pub array_size: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            array_size: DEFAULT_ARRAY_SIZE,
        }
    }
}

impl HarnessConfig {
    /// # Errors
    ///
    /// Returns a configuration error if either field is zero.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(config_error("iterations must be at least 1"));
        }

        if self.array_size == 0 {
            return Err(config_error("array size must be at least 1"));
        }

        Ok(())
    }
}

/// Timings and sample output of one method.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodReport {
    pub method: Method,
    /// Wall time of each pass in whole milliseconds.
    pub iterations_ms: Vec<u128>,
    /// Sum of `iterations_ms` divided by the iteration count, rounded down.
    pub average_ms: u128,
    /// First element of the output after the last pass.
    pub result: f32,
}

impl fmt::Display for MethodReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ms in &self.iterations_ms {
            write!(f, "{ms}ms ")?;
        }
        writeln!(f)?;
        writeln!(f, "result: {}", self.result)?;
        write!(
            f,
            "{} method took an average of {} milliseconds over {} iterations",
            self.method.name(),
            self.average_ms,
            self.iterations_ms.len()
        )
    }
}

/// Sets every element of `buffer` to `value`.
pub fn fill(buffer: &mut [f32], value: f32) {
    buffer.fill(value);
}

/// Wall time of one pass of `method` over `input`.
pub fn time_method(method: Method, input: &[f32], output: &mut [f32]) -> Result<Duration> {
    let start = Instant::now();
    method.apply(input, output)?;
    Ok(start.elapsed())
}

/// Runs `config.iterations` timed passes of `method` with every input set to `value`.
///
/// # Errors
///
/// Fails on an invalid configuration, on empty buffers, or when the buffers
/// differ in length.
pub fn run_method(
    method: Method,
    value: f32,
    config: &HarnessConfig,
    input: &mut [f32],
    output: &mut [f32],
) -> Result<MethodReport> {
    config.validate()?;

    if output.is_empty() {
        return Err(validation_error("output buffer must not be empty"));
    }

    let mut iterations_ms = Vec::with_capacity(config.iterations);

    for iteration in 0..config.iterations {
        fill(input, value);
        let elapsed = time_method(method, input, output)?;
        debug!("{method}: iteration {iteration} took {elapsed:?}");
        iterations_ms.push(elapsed.as_millis());
    }

    let average_ms = iterations_ms.iter().sum::<u128>() / iterations_ms.len() as u128;
    info!("{method}: average {average_ms}ms over {} iterations", iterations_ms.len());

    Ok(MethodReport {
        method,
        iterations_ms,
        average_ms,
        result: output[0],
    })
}

/// Owns a pair of aligned buffers sized by a [`HarnessConfig`].
///
/// ```rust
/// use qrsqrt::harness::{Harness, HarnessConfig, Method};
///
/// let config = HarnessConfig { iterations: 2, array_size: 1024 };
/// let mut harness = Harness::new(config).unwrap();
/// harness.warm_cache(4.0).unwrap();
///
/// let report = harness.run_method(Method::MultipleDataSimd, 4.0).unwrap();
/// assert_eq!(report.iterations_ms.len(), 2);
/// assert!((report.result - 0.5).abs() < 0.001);
/// ```
#[derive(Debug)]
pub struct Harness {
    config: HarnessConfig,
    input: AlignedBuffer,
    output: AlignedBuffer,
}

impl Harness {
    /// Validates `config` and allocates both buffers.
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;

        let input = AlignedBuffer::zeroed(config.array_size, BUFFER_ALIGNMENT)?;
        let output = AlignedBuffer::zeroed(config.array_size, BUFFER_ALIGNMENT)?;

        Ok(Self {
            config,
            input,
            output,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn input(&self) -> &[f32] {
        &self.input
    }

    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Fills the input with `value` and times one pass of `method`.
    pub fn time_method(&mut self, method: Method, value: f32) -> Result<Duration> {
        fill(&mut self.input, value);
        time_method(method, &self.input, &mut self.output)
    }

    /// One untimed pass of [`Method::Original`] to bring both buffers into memory.
    pub fn warm_cache(&mut self, value: f32) -> Result<()> {
        let elapsed = self.time_method(Method::Original, value)?;
        debug!("cache warm-up took {elapsed:?}");
        Ok(())
    }

    pub fn run_method(&mut self, method: Method, value: f32) -> Result<MethodReport> {
        run_method(
            method,
            value,
            &self.config,
            &mut self.input,
            &mut self.output,
        )
    }

    /// Runs every method in `methods`, in order.
    pub fn run_all(&mut self, methods: &[Method], value: f32) -> Result<Vec<MethodReport>> {
        methods
            .iter()
            .map(|&method| self.run_method(method, value))
            .collect()
    }
}
