//! Event detection on one day at one space
//!
//! 1. Build the occupancy series from the day's observations and smooth it
//! 2. Find change points in the smoothed series with PELT
//! 3. Map every segment `[s, e)` to the minutes `[s * unit, e * unit - 1]`
//! 4. Keep the segments whose mean occupancy exceeds the occupancy threshold;
//!    their attendees are the clients observed within those minutes
//!
//! An all-zero series is a single segment with no change points, so it never
//! reaches the change-point search.

use std::{collections::BTreeSet, ops::Range};

use chrono::NaiveDate;
use scenlearn_model::{
    id::{ClientId, SpaceId},
    time_profile::{PatDur, TimeProfile, TimeProfileEntry},
};
use scenlearn_stats::{
    changepoint::{self, Pelt, SegmentationError},
    descriptive::MeanStd,
};

use crate::{config::SegmentationConfig, observation::Observation, occupancy::OccupancySeries};

/// Share of an interval's length used as the mean of its required duration.
const REQUIRED_MEAN_RATIO: f64 = 0.6;
/// Share of an interval's length used as the spread of its required duration.
const REQUIRED_STD_RATIO: f64 = 0.1;

/// One piece of a segmented day.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub buckets: Range<usize>,
    /// First minute of the segment.
    pub start_minute: u32,
    /// Last minute of the segment (inclusive).
    pub end_minute: u32,
    /// Occupancy of the segmented series within the segment.
    pub occupancy: MeanStd,
}

impl Segment {
    #[must_use]
    pub fn is_event(&self, occ_thresh: f64) -> bool {
        self.occupancy.mean > occ_thresh
    }

    /// Whether `observation` falls within the segment, compared at second
    /// resolution with both ends inclusive.
    #[must_use]
    pub fn contains(&self, observation: &Observation) -> bool {
        let second = observation.second_of_day();
        (self.start_minute * 60..=self.end_minute * 60).contains(&second)
    }
}

/// An event found by segmentation, before it is given an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedEvent {
    pub space: SpaceId,
    pub segment: Segment,
    pub attendees: BTreeSet<ClientId>,
    pub time_profile: TimeProfile,
}

/// Everything segmentation learned about one day at one space.
#[derive(Debug, Clone)]
pub struct DaySegmentation {
    pub series: OccupancySeries,
    pub breakpoints: Vec<usize>,
    pub segments: Vec<Segment>,
    pub events: Vec<DetectedEvent>,
}

/// Change points of `series`; the last one is always `series.len()`.
pub fn breakpoints(
    series: &[f64],
    config: &SegmentationConfig,
) -> Result<Vec<usize>, SegmentationError> {
    if !series.iter().any(|&value| value > 0.0) {
        return Ok(vec![series.len()]);
    }
    let pelt = Pelt {
        min_size: config.min_size(),
        jump: config.jump,
        penalty: config.penalty,
    };
    pelt.fit_predict(series)
}

/// Splits `series` into segments at `breakpoints`.
#[must_use]
pub fn segments(series: &OccupancySeries, breakpoints: &[usize]) -> Vec<Segment> {
    changepoint::segments(breakpoints)
        .map(|buckets| {
            let occupancy = MeanStd::from_values(series.smoothed()[buckets.clone()].iter().copied())
                .unwrap_or_default();
            Segment {
                start_minute: series.bucket_start(buckets.start),
                end_minute: series.bucket_start(buckets.end).saturating_sub(1),
                occupancy,
                buckets,
            }
        })
        .collect()
}

/// Runs the whole detection for one space on one day.
pub fn segment_day(
    date: NaiveDate,
    space: &SpaceId,
    observations: &[Observation],
    config: &SegmentationConfig,
) -> Result<DaySegmentation, SegmentationError> {
    let series = OccupancySeries::build(
        observations,
        config.unit,
        config.validity,
        config.series_len(),
    )
    .smoothed_with(config.smooth, config.window);
    let breakpoints = breakpoints(series.smoothed(), config)?;
    let segments = segments(&series, &breakpoints);

    let events = segments
        .iter()
        .filter(|segment| segment.is_event(config.occ_thresh))
        .map(|segment| {
            let attendees = observations
                .iter()
                .filter(|observation| segment.contains(observation))
                .map(|observation| observation.client.clone())
                .collect();
            let (start, end) = (
                f64::from(segment.start_minute),
                f64::from(segment.end_minute),
            );
            let length = end - start;
            let required = MeanStd::new(REQUIRED_MEAN_RATIO * length, REQUIRED_STD_RATIO * length);
            let pattern = PatDur::basic(date, start, end, required, 0);
            DetectedEvent {
                space: space.clone(),
                segment: segment.clone(),
                attendees,
                time_profile: TimeProfile::single(TimeProfileEntry::single(pattern)),
            }
        })
        .collect();

    Ok(DaySegmentation {
        series,
        breakpoints,
        segments,
        events,
    })
}
