//! Occupancy series
//!
//! A day at one space is cut into buckets of `unit` minutes. A client observed
//! at minute `m` counts as present in every bucket from `m / unit` through
//! `(m + validity) / unit` (integer division, inclusive, clamped to the end of
//! the day). The raw series holds the number of distinct clients present per
//! bucket; smoothing adds a filtered copy next to it.

use std::collections::BTreeSet;

use scenlearn_model::id::ClientId;
use scenlearn_stats::smoothing::{exponential_moving_average, simple_moving_average};

use crate::{config::SmoothingKind, observation::Observation};

impl SmoothingKind {
    /// Filters `values` with this policy; the length never changes.
    #[must_use]
    pub fn apply(self, values: &[f64], window: usize) -> Vec<f64> {
        match self {
            Self::None => values.to_vec(),
            Self::Simple => simple_moving_average(values, window),
            Self::Exponential => exponential_moving_average(values, window),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySeries {
    unit: u32,
    counts: Vec<f64>,
    smoothed: Vec<f64>,
}

impl OccupancySeries {
    /// Builds the raw series of `len` buckets from one day of observations.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn build(observations: &[Observation], unit: u32, validity: u32, len: usize) -> Self {
        let mut present = vec![BTreeSet::<&ClientId>::new(); len];
        if len > 0 {
            for observation in observations {
                let arrival = observation.minute_of_day();
                let first = (arrival / unit) as usize;
                let last = (arrival.saturating_add(validity) / unit) as usize;
                for bucket in &mut present[first.min(len)..=last.min(len - 1)] {
                    bucket.insert(&observation.client);
                }
            }
        }
        let counts = present.iter().map(|b| b.len() as f64).collect::<Vec<_>>();
        Self::from_counts(counts, unit)
    }

    /// A series over precomputed counts, not yet smoothed.
    #[must_use]
    pub fn from_counts(counts: Vec<f64>, unit: u32) -> Self {
        Self {
            unit,
            smoothed: counts.clone(),
            counts,
        }
    }

    /// Replaces the smoothed series by `kind` applied to the raw counts.
    #[must_use]
    pub fn smoothed_with(mut self, kind: SmoothingKind, window: usize) -> Self {
        self.smoothed = kind.apply(&self.counts, window);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[must_use]
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    #[must_use]
    pub fn smoothed(&self) -> &[f64] {
        &self.smoothed
    }

    /// Start of `bucket`, in minutes after midnight.
    #[must_use]
    pub fn bucket_start(&self, bucket: usize) -> u32 {
        u32::try_from(bucket).map_or(u32::MAX, |b| b.saturating_mul(self.unit))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;

    fn obs(hour: u32, minute: u32, client: &str) -> Observation {
        let date = NaiveDate::from_ymd_opt(2017, 11, 28).unwrap();
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap();
        Observation::new(date.and_time(time), ClientId::from(client))
    }

    #[test]
    fn test_no_observations() {
        let series = OccupancySeries::build(&[], 5, 10, 288);
        assert_eq!(series.len(), 288);
        assert!(series.counts().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_validity_window() {
        let observations = [obs(9, 0, "A"), obs(9, 2, "B"), obs(9, 20, "C")];
        let series = OccupancySeries::build(&observations, 5, 10, 288);
        // 09:00 is bucket 108
        assert_eq!(&series.counts()[107..115], &[0.0, 2.0, 2.0, 2.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_repeated_client_counts_once() {
        let observations = [obs(9, 0, "A"), obs(9, 3, "A"), obs(9, 6, "A")];
        let series = OccupancySeries::build(&observations, 5, 10, 288);
        assert!(series.counts().iter().all(|&c| c <= 1.0));
        assert_eq!(series.counts()[109], 1.0);
    }

    #[test]
    fn test_huge_validity_lasts_until_end_of_day() {
        let series = OccupancySeries::build(&[obs(9, 0, "A")], 5, u32::MAX, 288);
        assert_eq!(series.counts()[107], 0.0);
        assert!(series.counts()[108..].iter().all(|&c| c == 1.0));
    }

    #[test]
    fn test_clamped_at_end_of_day() {
        let series = OccupancySeries::build(&[obs(23, 58, "A")], 5, 10, 288);
        assert_eq!(series.counts()[287], 1.0);
        assert_eq!(series.len(), 288);
    }

    #[test]
    fn test_matches_interval_definition() {
        let mut rng = Pcg32::seed_from_u64(0x5eed);
        for _ in 0..20 {
            let unit = rng.random_range(1..=15);
            let validity = rng.random_range(0..=30);
            let len = (24 * 60_u32).div_ceil(unit) as usize;
            let observations = (0..rng.random_range(0..40))
                .map(|_| {
                    let client = format!("c{}", rng.random_range(0..8));
                    obs(rng.random_range(0..24), rng.random_range(0..60), &client)
                })
                .collect::<Vec<_>>();

            let series = OccupancySeries::build(&observations, unit, validity, len);
            for (bucket, &count) in series.counts().iter().enumerate() {
                let lo = bucket as u32 * unit;
                let hi = lo + unit;
                let expected = observations
                    .iter()
                    .filter(|o| {
                        let arrival = o.minute_of_day();
                        arrival < hi && arrival + validity >= lo
                    })
                    .map(|o| &o.client)
                    .collect::<BTreeSet<_>>()
                    .len();
                assert_eq!(count, expected as f64, "bucket {bucket} unit {unit}");
            }
        }
    }

    #[test]
    fn test_smoothing_keeps_raw_counts_and_length() {
        let series = OccupancySeries::from_counts(vec![0.0, 4.0, 4.0, 0.0], 5);
        for kind in [SmoothingKind::None, SmoothingKind::Simple, SmoothingKind::Exponential] {
            let smoothed = series.clone().smoothed_with(kind, 3);
            assert_eq!(smoothed.counts(), series.counts());
            assert_eq!(smoothed.smoothed().len(), 4);
        }
        let ema = series.smoothed_with(SmoothingKind::Exponential, 3);
        assert_eq!(ema.smoothed(), &[0.0, 2.0, 3.0, 1.5]);
    }
}
