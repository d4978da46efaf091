//! Temporal patterns
//!
//! A [`PatDur`] (pattern + duration) describes one recurring time-of-day
//! interval: the calendar span it covers, the weekdays it recurs on, and
//! `(mean, std)` estimates of its start time, end time and required duration.
//! Times are minutes after midnight; durations are minutes.
//!
//! ```text
//! TimeProfile
//! └─ (probability, TimeProfileEntry)*
//!     └─ PatDur*
//!         ├─ pattern:  start-date, end-date, period (week), days-of-week
//!         └─ duration: start-time, end-time, required  (each mean ± std)
//! ```
//!
//! # Merging
//!
//! [`PatDur::merge`] folds many instances of a pattern (e.g. the same meeting
//! observed on different days) into one statistical summary:
//!
//! - the date range spans the earliest start date to the latest end date
//! - the weekday set is the union of the start and end dates' weekdays
//! - per calendar date, the earliest start, the latest end and the shortest
//!   duration are taken; the merged estimates are the mean and population
//!   standard deviation of those per-date extremes, rounded to whole minutes
//!
//! # Serialization
//!
//! Patterns serialize to the nested dictionary layout of the learned model
//! files, with ISO dates and `HH:MM:SS` strings for every time value:
//!
//! ```json
//! {
//!   "pattern": {
//!     "start-date": "2017-11-28", "end-date": "2017-11-28",
//!     "period": "week", "period-details": { "days-of-week": [2] }
//!   },
//!   "duration": {
//!     "start-time": ["09:00:00", "00:00:00"],
//!     "end-time": ["09:59:00", "00:00:00"],
//!     "required": ["00:35:24", "00:05:54"],
//!     "recurring": 0
//!   }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike as _, NaiveDate};
use scenlearn_stats::descriptive::MeanStd;
use serde::{Serialize, Serializer, ser::SerializeSeq as _};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MergeError {
    #[display("cannot merge an empty set of patterns")]
    Empty,
}

/// Recurrence period of a [`PatDur`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    #[default]
    Week,
}

/// A recurring time-of-day interval with statistical start, end and duration.
#[derive(Debug, Clone, PartialEq)]
pub struct PatDur {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period: Period,
    /// ISO weekday numbers, Monday = 1 through Sunday = 7.
    pub days_of_week: BTreeSet<u32>,
    pub start_time: MeanStd,
    pub end_time: MeanStd,
    pub required: MeanStd,
    pub recurring: u32,
}

impl PatDur {
    /// A single-day pattern with exact start and end times.
    #[must_use]
    pub fn basic(
        date: NaiveDate,
        start_time: f64,
        end_time: f64,
        required: MeanStd,
        recurring: u32,
    ) -> Self {
        Self {
            start_date: date,
            end_date: date,
            period: Period::Week,
            days_of_week: BTreeSet::from([iso_weekday(date)]),
            start_time: MeanStd::exact(start_time),
            end_time: MeanStd::exact(end_time),
            required,
            recurring,
        }
    }

    /// Merges pattern instances into one statistical pattern.
    ///
    /// See the [module documentation](self) for the merge rules.
    pub fn merge<'a, I>(patterns: I) -> Result<Self, MergeError>
    where
        I: IntoIterator<Item = &'a PatDur>,
    {
        let mut starts = BTreeMap::<NaiveDate, Vec<f64>>::new();
        let mut ends = BTreeMap::<NaiveDate, Vec<f64>>::new();
        let mut required = BTreeMap::<NaiveDate, Vec<f64>>::new();
        let mut days_of_week = BTreeSet::new();

        for pattern in patterns {
            starts
                .entry(pattern.start_date)
                .or_default()
                .push(pattern.start_time.mean);
            ends.entry(pattern.end_date)
                .or_default()
                .push(pattern.end_time.mean);
            required
                .entry(pattern.end_date)
                .or_default()
                .push(pattern.end_time.mean - pattern.start_time.mean);
            days_of_week.insert(iso_weekday(pattern.start_date));
            days_of_week.insert(iso_weekday(pattern.end_date));
        }

        let (Some(&start_date), Some(&end_date)) = (starts.keys().next(), ends.keys().next_back())
        else {
            return Err(MergeError::Empty);
        };

        Ok(Self {
            start_date,
            end_date,
            period: Period::Week,
            days_of_week,
            start_time: summarize(starts.values(), f64::min)?,
            end_time: summarize(ends.values(), f64::max)?,
            required: summarize(required.values(), f64::min)?,
            recurring: 0,
        })
    }
}

/// Reduces each per-date group with `pick` and summarizes the picks.
fn summarize<'a, I>(groups: I, pick: fn(f64, f64) -> f64) -> Result<MeanStd, MergeError>
where
    I: IntoIterator<Item = &'a Vec<f64>>,
{
    let picks = groups
        .into_iter()
        .filter_map(|group| group.iter().copied().reduce(pick));
    MeanStd::from_values(picks)
        .map(|summary| summary.round_to(0))
        .ok_or(MergeError::Empty)
}

fn iso_weekday(date: NaiveDate) -> u32 {
    date.weekday().number_from_monday()
}

/// An ordered collection of [`PatDur`]s describing one coherent temporal pattern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeProfileEntry {
    patterns: Vec<PatDur>,
}

impl TimeProfileEntry {
    #[must_use]
    pub fn new(patterns: Vec<PatDur>) -> Self {
        Self { patterns }
    }

    #[must_use]
    pub fn single(pattern: PatDur) -> Self {
        Self::new(vec![pattern])
    }

    #[must_use]
    pub fn patterns(&self) -> &[PatDur] {
        &self.patterns
    }

    #[must_use]
    pub fn mean_start_time(&self) -> Option<f64> {
        MeanStd::from_values(self.patterns.iter().map(|p| p.start_time.mean)).map(|s| s.mean)
    }

    #[must_use]
    pub fn mean_end_time(&self) -> Option<f64> {
        MeanStd::from_values(self.patterns.iter().map(|p| p.end_time.mean)).map(|s| s.mean)
    }

    /// Similarity in time of two entries, in `[0, 1]`.
    ///
    /// Compares the `[mean start, mean end]` intervals of both entries: the
    /// length of their overlap divided by the span from the earlier start to
    /// the later end. Disjoint intervals score `0`, identical intervals `1`.
    /// An empty entry scores `0` against anything; two identical zero-width
    /// intervals score `1`.
    #[must_use]
    pub fn diff(a: &Self, b: &Self) -> f64 {
        let (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) = (
            a.mean_start_time(),
            a.mean_end_time(),
            b.mean_start_time(),
            b.mean_end_time(),
        ) else {
            return 0.0;
        };
        let span = a_end.max(b_end) - a_start.min(b_start);
        let overlap = (a_end.min(b_end) - a_start.max(b_start)).max(0.0);
        if span <= 0.0 {
            return if (a_start - b_start).abs() < f64::EPSILON { 1.0 } else { 0.0 };
        }
        (overlap / span).clamp(0.0, 1.0)
    }
}

/// Alternative temporal behaviors, each weighted by a probability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeProfile {
    entries: Vec<(f64, TimeProfileEntry)>,
}

impl TimeProfile {
    /// A profile with one entry of probability `1.0`.
    #[must_use]
    pub fn single(entry: TimeProfileEntry) -> Self {
        Self {
            entries: vec![(1.0, entry)],
        }
    }

    /// The first (most likely) entry.
    #[must_use]
    pub fn primary(&self) -> Option<&TimeProfileEntry> {
        self.entries.first().map(|(_, entry)| entry)
    }

    /// Every pattern across every entry.
    pub fn patterns(&self) -> impl Iterator<Item = &PatDur> {
        self.entries
            .iter()
            .flat_map(|(_, entry)| entry.patterns().iter())
    }

    /// A single-entry profile holding the merge of every pattern in `profiles`.
    pub fn merged<'a, I>(profiles: I) -> Result<Self, MergeError>
    where
        I: IntoIterator<Item = &'a TimeProfile>,
    {
        let merged = PatDur::merge(profiles.into_iter().flat_map(TimeProfile::patterns))?;
        Ok(Self::single(TimeProfileEntry::single(merged)))
    }
}

/// Formats minutes after midnight as `HH:MM:SS`, rounded to the second.
///
/// ```
/// use scenlearn_model::time_profile::clock_string;
///
/// assert_eq!(clock_string(545.5), "09:05:30");
/// assert_eq!(clock_string(0.0), "00:00:00");
/// ```
#[expect(clippy::cast_possible_truncation)]
#[must_use]
pub fn clock_string(minutes: f64) -> String {
    let total_seconds = (minutes * 60.0).round() as i64;
    let (total_minutes, seconds) = (total_seconds.div_euclid(60), total_seconds.rem_euclid(60));
    let (hours, minutes) = (total_minutes.div_euclid(60), total_minutes.rem_euclid(60));
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

struct Clock(MeanStd);

impl Serialize for Clock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&clock_string(self.0.mean))?;
        seq.serialize_element(&clock_string(self.0.std_dev))?;
        seq.end()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct PatternRecord<'a> {
    start_date: String,
    end_date: String,
    period: Period,
    period_details: PeriodDetailsRecord<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct PeriodDetailsRecord<'a> {
    days_of_week: &'a BTreeSet<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct DurationRecord {
    start_time: Clock,
    end_time: Clock,
    required: Clock,
    recurring: u32,
}

#[derive(Serialize)]
struct PatDurRecord<'a> {
    pattern: PatternRecord<'a>,
    duration: DurationRecord,
}

impl Serialize for PatDur {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        PatDurRecord {
            pattern: PatternRecord {
                start_date: self.start_date.format("%Y-%m-%d").to_string(),
                end_date: self.end_date.format("%Y-%m-%d").to_string(),
                period: self.period,
                period_details: PeriodDetailsRecord {
                    days_of_week: &self.days_of_week,
                },
            },
            duration: DurationRecord {
                start_time: Clock(self.start_time),
                end_time: Clock(self.end_time),
                required: Clock(self.required),
                recurring: self.recurring,
            },
        }
        .serialize(serializer)
    }
}

impl Serialize for TimeProfileEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.patterns.serialize(serializer)
    }
}

#[derive(Serialize)]
struct WeightedEntryRecord<'a> {
    probability: f64,
    profile: &'a TimeProfileEntry,
}

impl Serialize for TimeProfile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.entries.iter().map(|(probability, profile)| {
            WeightedEntryRecord {
                probability: *probability,
                profile,
            }
        }))
    }
}
