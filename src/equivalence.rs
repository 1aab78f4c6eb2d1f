//! Cross-checks the lane widths against each other.
//!
//! For every input of a sweep the checker computes the scalar result, the
//! 8-lane result of a splatted register and the single-lane result, then
//! applies two comparisons:
//!
//! 1. scalar against wide lane 0 (within the tolerance), then wide lane 0
//!    against wide lane 7 (exact);
//! 2. scalar against the single-lane result (within the tolerance), then wide
//!    lane 0 against the single-lane result (exact).
//!
//! A tolerance failure skips the exact comparison of the same step.
//!
//! ```rust
//! use qrsqrt::equivalence::{EquivalenceChecker, FailurePolicy};
//!
//! let report = EquivalenceChecker::new()
//!     .with_policy(FailurePolicy::Strict)
//!     .run((1..100).map(|i| i as f32))
//!     .unwrap();
//! assert_eq!(report.checked, 99);
//! assert!(report.is_clean());
//! ```

use std::fmt;

use log::{debug, warn};

use crate::{
    error::{Result, RsqrtError},
    simd::{approx_rsqrt, approx_rsqrt_single, approx_rsqrt_wide, Lanes8},
};

/// Largest accepted absolute difference between the scalar and a vector result.
pub const DEFAULT_TOLERANCE: f32 = 1e-7;

/// The default sweep checks the integers `0..DEFAULT_SWEEP_END` as `f32`.
pub const DEFAULT_SWEEP_END: u32 = 10_000;

/// What a sweep does when it finds a mismatch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log every mismatch at `warn` level and keep going; the sweep succeeds.
    #[default]
    Observe,
    /// Finish the sweep, then fail with [`RsqrtError::DriftError`].
    Strict,
}

/// A single disagreement between lane widths.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Mismatch {
    /// A vector result is further than the tolerance from the scalar one.
    Tolerance {
        input: f32,
        reference: f32,
        candidate: f32,
        /// `candidate - reference`
        difference: f32,
    },
    /// Lanes 0 and 7 of one 8-lane result differ.
    LaneDivergence {
        input: f32,
        first_lane: f32,
        last_lane: f32,
    },
    /// The 8-lane and the single-lane results differ.
    NarrowDivergence { input: f32, wide: f32, narrow: f32 },
}

impl Mismatch {
    /// The input value that produced this mismatch.
    pub fn input(&self) -> f32 {
        match *self {
            Mismatch::Tolerance { input, .. }
            | Mismatch::LaneDivergence { input, .. }
            | Mismatch::NarrowDivergence { input, .. } => input,
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Tolerance {
                input, difference, ..
            } => write!(
                f,
                "ERR: Results from tests fell beyond margin of error! Difference: {difference} (input {input})"
            ),
            Mismatch::LaneDivergence {
                input,
                first_lane,
                last_lane,
            } => write!(
                f,
                "ERR: Vector does not match! (input {input}: lane 0 = {first_lane}, lane 7 = {last_lane})"
            ),
            Mismatch::NarrowDivergence {
                input,
                wide,
                narrow,
            } => write!(
                f,
                "ERR: Vector does not match! (input {input}: wide = {wide}, single = {narrow})"
            ),
        }
    }
}

/// Results of every lane width for one input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sample {
    pub input: f32,
    pub scalar: f32,
    pub wide: Lanes8,
    pub single: f32,
}

impl Sample {
    pub fn compute(input: f32) -> Self {
        Self {
            input,
            scalar: approx_rsqrt(input),
            wide: approx_rsqrt_wide(&Lanes8::splat(input)),
            single: approx_rsqrt_single(&input),
        }
    }
}

/// One comparison step: `candidate` against `reference` within `tolerance`,
/// then `candidate` against `same_as_candidate` exactly.
///
/// Returns the first failure, if any; a tolerance failure short-circuits.
pub fn compare_results(
    input: f32,
    reference: f32,
    candidate: f32,
    same_as_candidate: f32,
    tolerance: f32,
) -> Option<Mismatch> {
    if (reference - candidate).abs() > tolerance {
        return Some(Mismatch::Tolerance {
            input,
            reference,
            candidate,
            difference: candidate - reference,
        });
    }

    if candidate.to_bits() != same_as_candidate.to_bits() {
        return Some(Mismatch::LaneDivergence {
            input,
            first_lane: candidate,
            last_lane: same_as_candidate,
        });
    }

    None
}

/// Summary of a sweep.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepReport {
    /// Number of inputs checked.
    pub checked: usize,
    /// Every mismatch found, in input order.
    pub mismatches: Vec<Mismatch>,
    /// Largest `|scalar - vector|` seen over all inputs and widths.
    pub max_abs_difference: f32,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checked {} inputs, {} mismatch(es), max |scalar - vector| = {:e}",
            self.checked,
            self.mismatches.len(),
            self.max_abs_difference
        )
    }
}

/// Runs the lane-width comparisons over a set of inputs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EquivalenceChecker {
    tolerance: f32,
    policy: FailurePolicy,
}

impl Default for EquivalenceChecker {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            policy: FailurePolicy::default(),
        }
    }
}

impl EquivalenceChecker {
    /// Checker with [`DEFAULT_TOLERANCE`] and [`FailurePolicy::Observe`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// All mismatches for one computed sample.
    pub fn check_sample(&self, sample: &Sample) -> Vec<Mismatch> {
        let mut found = Vec::new();

        let wide_first = sample.wide[0];
        let wide_last = sample.wide[Lanes8::LANES - 1];

        found.extend(compare_results(
            sample.input,
            sample.scalar,
            wide_first,
            wide_last,
            self.tolerance,
        ));

        let narrow = compare_results(
            sample.input,
            sample.scalar,
            sample.single,
            wide_first,
            self.tolerance,
        )
        .map(|mismatch| match mismatch {
            Mismatch::LaneDivergence { input, .. } => Mismatch::NarrowDivergence {
                input,
                wide: wide_first,
                narrow: sample.single,
            },
            other => other,
        });
        found.extend(narrow);

        found
    }

    /// All mismatches for one input.
    pub fn check_value(&self, input: f32) -> Vec<Mismatch> {
        self.check_sample(&Sample::compute(input))
    }

    /// Checks every input and applies the failure policy.
    ///
    /// # Errors
    ///
    /// With [`FailurePolicy::Strict`], returns [`RsqrtError::DriftError`] once
    /// the sweep is complete if anything disagreed.
    pub fn run<I>(&self, inputs: I) -> Result<SweepReport>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut report = SweepReport::default();

        for input in inputs {
            let sample = Sample::compute(input);

            for vector in [sample.wide[0], sample.single] {
                let difference = (sample.scalar - vector).abs();
                report.max_abs_difference = report.max_abs_difference.max(difference);
            }

            for mismatch in self.check_sample(&sample) {
                warn!("{mismatch}");
                report.mismatches.push(mismatch);
            }

            report.checked += 1;
        }

        debug!("equivalence sweep: {report}");

        if let (FailurePolicy::Strict, Some(&first)) = (self.policy, report.mismatches.first()) {
            return Err(RsqrtError::DriftError {
                mismatches: report.mismatches.len(),
                first,
            });
        }

        Ok(report)
    }

    /// Runs [`run`](Self::run) over `0..DEFAULT_SWEEP_END`.
    pub fn run_default_sweep(&self) -> Result<SweepReport> {
        self.run(default_sweep())
    }
}

/// The integers `0..DEFAULT_SWEEP_END` as `f32`, zero included.
pub fn default_sweep() -> impl Iterator<Item = f32> {
    (0..DEFAULT_SWEEP_END).map(|i| i as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod compare_tests {
        use super::*;

        #[test]
        fn test_within_tolerance_and_equal() {
            assert_eq!(compare_results(4.0, 0.5, 0.5, 0.5, DEFAULT_TOLERANCE), None);
        }

        #[test]
        fn test_tolerance_short_circuits() {
            let mismatch = compare_results(4.0, 0.5, 0.6, 0.7, DEFAULT_TOLERANCE).unwrap();
            match mismatch {
                Mismatch::Tolerance { difference, .. } => {
                    assert!((difference - 0.1).abs() < 1e-6);
                }
                other => panic!("expected tolerance mismatch, got {other:?}"),
            }
            assert!(mismatch
                .to_string()
                .starts_with("ERR: Results from tests fell beyond margin of error! Difference:"));
        }

        #[test]
        fn test_lane_divergence() {
            let mismatch = compare_results(9.0, 0.333, 0.333, 0.334, 0.01).unwrap();
            assert_eq!(
                mismatch,
                Mismatch::LaneDivergence {
                    input: 9.0,
                    first_lane: 0.333,
                    last_lane: 0.334,
                }
            );
            assert!(mismatch.to_string().starts_with("ERR: Vector does not match!"));
            assert_eq!(mismatch.input(), 9.0);
        }
    }

    mod checker_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let checker = EquivalenceChecker::new();
            assert_eq!(checker.tolerance(), DEFAULT_TOLERANCE);
            assert_eq!(checker.policy(), FailurePolicy::Observe);
        }

        #[test]
        fn test_check_value_clean() {
            let checker = EquivalenceChecker::new();
            for x in [0.0f32, 1.0, 2.0, 4.0, 9999.0] {
                assert!(checker.check_value(x).is_empty(), "input {x}");
            }
        }

        #[test]
        fn test_sample_lanes_agree() {
            let sample = Sample::compute(123.0);
            for lane in 0..Lanes8::LANES {
                assert_eq!(sample.wide[lane].to_bits(), sample.scalar.to_bits());
            }
            assert_eq!(sample.single.to_bits(), sample.scalar.to_bits());
        }

        #[test]
        fn test_narrow_divergence_is_reported() {
            let mut sample = Sample::compute(16.0);
            sample.single = f32::from_bits(sample.single.to_bits() + 1);

            let found = EquivalenceChecker::new()
                .with_tolerance(1.0)
                .check_sample(&sample);
            assert_eq!(found.len(), 1);
            assert!(matches!(found[0], Mismatch::NarrowDivergence { input, .. } if input == 16.0));
        }

        #[test]
        fn test_default_sweep_is_clean() {
            let report = EquivalenceChecker::new().run_default_sweep().unwrap();
            assert_eq!(report.checked, DEFAULT_SWEEP_END as usize);
            assert!(report.is_clean(), "{report}");
            assert_eq!(report.max_abs_difference, 0.0);
        }

        #[test]
        fn test_strict_fails_after_full_sweep() {
            // a negative tolerance makes every comparison fail
            let checker = EquivalenceChecker::new()
                .with_tolerance(-1.0)
                .with_policy(FailurePolicy::Strict);

            let err = checker.run([1.0f32, 2.0, 3.0]).unwrap_err();
            match err {
                RsqrtError::DriftError { mismatches, first } => {
                    assert_eq!(mismatches, 6);
                    assert_eq!(first.input(), 1.0);
                }
                other => panic!("expected drift error, got {other:?}"),
            }
        }

        #[test]
        fn test_observe_collects_and_succeeds() {
            let report = EquivalenceChecker::new()
                .with_tolerance(-1.0)
                .run([1.0f32, 2.0])
                .unwrap();
            assert_eq!(report.checked, 2);
            assert_eq!(report.mismatches.len(), 4);
            assert!(!report.is_clean());
        }
    }
}
