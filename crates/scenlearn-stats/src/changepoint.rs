//! Offline change-point detection
//!
//! This module segments a one-dimensional series into contiguous pieces whose
//! values are internally homogeneous, using the PELT (Pruned Exact Linear
//! Time) search over a kernel cost.
//!
//! # Cost Model
//!
//! [`RbfCost`] scores a segment `[start, end)` with the Gaussian (RBF) kernel
//! `k(x, y) = exp(-gamma * (x - y)^2)`:
//!
//! ```text
//! cost(start, end) = (end - start) - (1 / (end - start)) * Σᵢ Σⱼ k(xᵢ, xⱼ)
//! ```
//!
//! The bandwidth `gamma` is the reciprocal of the median squared distance
//! between all pairs of samples (or `1` when that median is zero). Scaled
//! distances are clipped to `[1e-2, 1e2]` before exponentiation; the diagonal
//! of the Gram matrix is exactly `1`.
//!
//! # Search
//!
//! [`Pelt`] minimizes `Σ cost(segment) + penalty * #segments` over all
//! segmentations whose segments are at least `min_size` samples long and whose
//! breakpoints lie on a grid of `jump` samples (the series end is always a
//! breakpoint). Candidate segment starts that can no longer lead to an optimal
//! segmentation are pruned. Ties are broken toward the earliest start, which
//! makes the result fully deterministic.
//!
//! # Examples
//!
//! ```
//! use scenlearn_stats::changepoint::Pelt;
//!
//! let mut signal = vec![1.0; 30];
//! signal.extend([8.0; 30]);
//! signal.extend([1.0; 30]);
//!
//! let pelt = Pelt { min_size: 6, jump: 5, penalty: 0.3 };
//! assert_eq!(pelt.fit_predict(&signal).unwrap(), vec![30, 60, 90]);
//! ```

use std::iter;

const MIN_SCALED_DISTANCE: f64 = 1e-2;
const MAX_SCALED_DISTANCE: f64 = 1e2;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SegmentationError {
    #[display("cannot segment an empty signal")]
    EmptySignal,
    #[display("minimum segment size {min_size} exceeds signal length {len}")]
    MinSizeTooLarge { min_size: usize, len: usize },
    #[display("no admissible segmentation of a signal of length {len}")]
    NoAdmissibleSegmentation { len: usize },
}

/// RBF kernel segment cost with O(1) evaluation.
///
/// Construction builds the full Gram matrix once and keeps its 2-D prefix sums,
/// so memory is `O(n²)` in the signal length.
#[derive(Debug, Clone)]
pub struct RbfCost {
    len: usize,
    // (len + 1) x (len + 1), row-major
    prefix: Vec<f64>,
}

impl RbfCost {
    #[must_use]
    pub fn new(signal: &[f64]) -> Self {
        let len = signal.len();
        let gamma = median_heuristic_gamma(signal);

        let width = len + 1;
        let mut prefix = vec![0.0; width * width];
        for i in 0..len {
            let mut row_sum = 0.0;
            for j in 0..len {
                row_sum += kernel(signal[i], signal[j], i == j, gamma);
                prefix[(i + 1) * width + (j + 1)] = prefix[i * width + (j + 1)] + row_sum;
            }
        }
        Self { len, prefix }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cost of the segment `[start, end)`.
    ///
    /// # Panics
    ///
    /// Panics if the segment is empty or extends past the signal.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn error(&self, start: usize, end: usize) -> f64 {
        assert!(start < end && end <= self.len, "invalid segment {start}..{end}");
        let width = self.len + 1;
        let block = self.prefix[end * width + end] - self.prefix[start * width + end]
            - self.prefix[end * width + start]
            + self.prefix[start * width + start];
        let size = (end - start) as f64;
        size - block / size
    }
}

fn kernel(x: f64, y: f64, diagonal: bool, gamma: f64) -> f64 {
    if diagonal {
        return 1.0;
    }
    let scaled = ((x - y).powi(2) * gamma).clamp(MIN_SCALED_DISTANCE, MAX_SCALED_DISTANCE);
    (-scaled).exp()
}

fn median_heuristic_gamma(signal: &[f64]) -> f64 {
    let mut distances = signal
        .iter()
        .enumerate()
        .flat_map(|(i, x)| signal[i + 1..].iter().map(move |y| (x - y).powi(2)))
        .collect::<Vec<_>>();
    if distances.is_empty() {
        return 1.0;
    }
    distances.sort_by(f64::total_cmp);
    let mid = distances.len() / 2;
    let median = if distances.len() % 2 == 0 {
        f64::midpoint(distances[mid - 1], distances[mid])
    } else {
        distances[mid]
    };
    if median > 0.0 { 1.0 / median } else { 1.0 }
}

/// PELT change-point search with an RBF kernel cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pelt {
    /// Minimum number of samples in a segment (values below 1 act as 1).
    pub min_size: usize,
    /// Breakpoints other than the series end must be multiples of `jump`
    /// (values below 1 act as 1).
    pub jump: usize,
    /// Penalty added per segment.
    pub penalty: f64,
}

impl Pelt {
    /// Returns the increasing list of breakpoints; the last one is always
    /// `signal.len()`.
    ///
    /// Each breakpoint is the exclusive end of a segment, so the breakpoints
    /// partition `[0, signal.len())` exactly.
    pub fn fit_predict(&self, signal: &[f64]) -> Result<Vec<usize>, SegmentationError> {
        let len = signal.len();
        if len == 0 {
            return Err(SegmentationError::EmptySignal);
        }
        let min_size = self.min_size.max(1);
        let jump = self.jump.max(1);
        if min_size > len {
            return Err(SegmentationError::MinSizeTooLarge { min_size, len });
        }

        let cost = RbfCost::new(signal);

        // best total cost of segmenting [0, end) and the start of its last segment
        let mut best = vec![None::<(f64, usize)>; len + 1];
        best[0] = Some((0.0, 0));

        let mut admissible = vec![];
        let ends = (0..len)
            .step_by(jump)
            .filter(|&end| end >= min_size)
            .chain(iter::once(len));
        for end in ends {
            admissible.push((end - min_size) / jump * jump);

            let candidates = admissible
                .iter()
                .filter_map(|&start| {
                    let (prefix_cost, _) = best[start]?;
                    Some((start, prefix_cost + cost.error(start, end) + self.penalty))
                })
                .collect::<Vec<_>>();

            let mut optimum: Option<(f64, usize)> = None;
            for &(start, total) in &candidates {
                if optimum.is_none_or(|(current, _)| total < current) {
                    optimum = Some((total, start));
                }
            }
            let Some((optimum_cost, _)) = optimum else {
                continue;
            };
            best[end] = optimum;

            admissible = candidates
                .into_iter()
                .filter(|&(_, total)| total <= optimum_cost + self.penalty)
                .map(|(start, _)| start)
                .collect();
        }

        if best[len].is_none() {
            return Err(SegmentationError::NoAdmissibleSegmentation { len });
        }

        let mut breakpoints = vec![];
        let mut end = len;
        while end > 0 {
            breakpoints.push(end);
            let Some((_, start)) = best[end] else {
                return Err(SegmentationError::NoAdmissibleSegmentation { len });
            };
            end = start;
        }
        breakpoints.reverse();
        Ok(breakpoints)
    }
}

/// Splits `[0, len)` at `breakpoints` into consecutive half-open ranges.
///
/// ```
/// use scenlearn_stats::changepoint::segments;
///
/// let ranges = segments(&[3, 7, 10]).collect::<Vec<_>>();
/// assert_eq!(ranges, vec![0..3, 3..7, 7..10]);
/// ```
pub fn segments(breakpoints: &[usize]) -> impl Iterator<Item = std::ops::Range<usize>> + '_ {
    iter::once(0)
        .chain(breakpoints.iter().copied())
        .zip(breakpoints.iter().copied())
        .map(|(start, end)| start..end)
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    fn assert_partition(breakpoints: &[usize], len: usize) {
        assert_eq!(breakpoints.last(), Some(&len));
        assert!(breakpoints.is_sorted_by(|a, b| a < b));
        let covered = segments(breakpoints).map(|r| r.len()).sum::<usize>();
        assert_eq!(covered, len);
    }

    mod rbf_cost {
        use super::*;

        #[test]
        fn test_single_sample_costs_nothing() {
            let cost = RbfCost::new(&[1.0, 5.0, 9.0]);
            assert!(cost.error(1, 2).abs() < 1e-12);
        }

        #[test]
        fn test_heterogeneous_segment_costs_more() {
            let cost = RbfCost::new(&[0.0, 0.0, 0.0, 10.0, 10.0, 10.0]);
            let flat = cost.error(0, 3);
            let mixed = cost.error(1, 4);
            assert!(mixed > flat);
        }

        #[test]
        fn test_constant_signal_uses_unit_gamma() {
            let cost = RbfCost::new(&[4.0; 5]);
            // off-diagonal kernel = exp(-0.01)
            let expected = 5.0 - (5.0 + 20.0 * (-0.01_f64).exp()) / 5.0;
            assert!((cost.error(0, 5) - expected).abs() < 1e-9);
        }
    }

    mod pelt {
        use super::*;

        #[test]
        fn test_empty_signal() {
            let pelt = Pelt { min_size: 1, jump: 1, penalty: 0.3 };
            assert_eq!(pelt.fit_predict(&[]), Err(SegmentationError::EmptySignal));
        }

        #[test]
        fn test_min_size_too_large() {
            let pelt = Pelt { min_size: 11, jump: 5, penalty: 0.3 };
            assert_eq!(
                pelt.fit_predict(&[0.0; 10]),
                Err(SegmentationError::MinSizeTooLarge { min_size: 11, len: 10 })
            );
        }

        #[test]
        fn test_min_size_equal_to_len_yields_one_segment() {
            let pelt = Pelt { min_size: 10, jump: 5, penalty: 0.3 };
            assert_eq!(pelt.fit_predict(&[0.0, 9.0].repeat(5)), Ok(vec![10]));
        }

        #[test]
        fn test_constant_signal_is_one_segment() {
            let pelt = Pelt { min_size: 2, jump: 5, penalty: 0.3 };
            assert_eq!(pelt.fit_predict(&[3.0; 50]), Ok(vec![50]));
        }

        #[test]
        fn test_detects_step() {
            let mut signal = vec![0.0; 25];
            signal.extend([6.0; 35]);
            let pelt = Pelt { min_size: 3, jump: 5, penalty: 0.3 };
            assert_eq!(pelt.fit_predict(&signal), Ok(vec![25, 60]));
        }

        #[test]
        fn test_breakpoints_on_jump_grid() {
            let mut signal = vec![0.0; 23];
            signal.extend([6.0; 20]);
            let pelt = Pelt { min_size: 3, jump: 5, penalty: 0.3 };
            let breakpoints = pelt.fit_predict(&signal).unwrap();
            for &bkp in &breakpoints[..breakpoints.len() - 1] {
                assert_eq!(bkp % 5, 0);
            }
        }

        #[test]
        fn test_random_signals_are_partitioned() {
            let mut rng = Pcg32::seed_from_u64(7);
            for _ in 0..20 {
                let len = rng.random_range(8..80);
                let signal = (0..len)
                    .map(|_| f64::from(rng.random_range(0..6_u8)))
                    .collect::<Vec<_>>();
                let min_size = rng.random_range(1..=4);
                let pelt = Pelt { min_size, jump: 5, penalty: 0.3 };
                let breakpoints = pelt.fit_predict(&signal).unwrap();
                assert_partition(&breakpoints, len);
                for range in segments(&breakpoints) {
                    assert!(range.len() >= min_size);
                }
            }
        }

        #[test]
        fn test_deterministic() {
            let signal = (0..60)
                .map(|i| f64::from((i * 7 % 11) as u8))
                .collect::<Vec<_>>();
            let pelt = Pelt { min_size: 2, jump: 2, penalty: 0.3 };
            assert_eq!(pelt.fit_predict(&signal), pelt.fit_predict(&signal));
        }
    }
}
