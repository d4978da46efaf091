//! Learner configuration
//!
//! Every tunable of the pipeline, grouped by the stage that reads it. The
//! date range is required; everything else has a default, so a configuration
//! file only needs to name what it changes:
//!
//! ```json
//! { "start": "2017-11-27", "end": "2017-12-01", "occ-thresh": 5 }
//! ```

use chrono::NaiveDate;
use scenlearn_model::id::SpaceId;
use serde::{Deserialize, Serialize};

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("start date {start} is after end date {end}")]
    EmptyDateRange { start: NaiveDate, end: NaiveDate },
    #[display("unit must be between 1 and 1440 minutes, got {unit}")]
    InvalidUnit { unit: u32 },
    #[display("validity must be at most 1440 minutes, got {validity}")]
    InvalidValidity { validity: u32 },
    #[display("smoothing window must be positive")]
    ZeroWindow,
    #[display("minimum event length of {min_size} buckets does not fit in a day of {len} buckets")]
    MinSizeTooLarge { min_size: usize, len: usize },
    #[display("{name} must be within [0, 1], got {value}")]
    RatioOutOfRange { name: &'static str, value: f64 },
    #[display("change-point penalty must be non-negative, got {penalty}")]
    NegativePenalty { penalty: f64 },
}

/// Filter applied to an occupancy series before segmentation.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingKind {
    None,
    #[serde(alias = "SMA")]
    Simple,
    #[default]
    #[serde(alias = "EMA")]
    Exponential,
}

/// How people are grouped into meta-people.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::FromStr,
)]
#[serde(rename_all = "kebab-case")]
pub enum PersonGrouping {
    /// Average-linkage clustering over `1 - jaccard` of attended events.
    #[default]
    Agglomerative,
    /// One greedy pass keeping people whose attended events overlap the seed's.
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LearnerConfig {
    /// First day to learn from.
    pub start: NaiveDate,
    /// Last day to learn from (inclusive).
    pub end: NaiveDate,
    /// Spaces to segment; observations at other spaces are ignored.
    #[serde(default)]
    pub spaces: Vec<SpaceId>,
    #[serde(flatten)]
    pub segmentation: SegmentationConfig,
    #[serde(flatten)]
    pub grouping: GroupingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SegmentationConfig {
    /// Bucket width of the occupancy series, in minutes.
    pub unit: u32,
    /// Minutes a client counts as present after being observed.
    pub validity: u32,
    /// Smoothing window (span, for the exponential filter), in buckets.
    pub window: usize,
    pub smooth: SmoothingKind,
    /// Minimum event duration, in minutes.
    pub time_thresh: u32,
    /// An interval becomes an event only if its mean occupancy exceeds this.
    pub occ_thresh: f64,
    /// Change-point penalty per segment.
    pub penalty: f64,
    /// Change-point grid, in buckets; 1 searches every bucket.
    pub jump: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            unit: 5,
            validity: 10,
            window: 10,
            smooth: SmoothingKind::default(),
            time_thresh: 30,
            occ_thresh: 20.0,
            penalty: 0.3,
            jump: 1,
        }
    }
}

impl SegmentationConfig {
    /// Number of buckets in one day.
    #[must_use]
    pub fn series_len(&self) -> usize {
        MINUTES_PER_DAY.div_ceil(self.unit.max(1)) as usize
    }

    /// Minimum segment length, in buckets.
    #[must_use]
    pub fn min_size(&self) -> usize {
        (self.time_thresh / self.unit.max(1)) as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.unit == 0 || self.unit > MINUTES_PER_DAY {
            return Err(ConfigError::InvalidUnit { unit: self.unit });
        }
        if self.validity > MINUTES_PER_DAY {
            return Err(ConfigError::InvalidValidity {
                validity: self.validity,
            });
        }
        if self.window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        let (min_size, len) = (self.min_size(), self.series_len());
        if min_size >= len {
            return Err(ConfigError::MinSizeTooLarge { min_size, len });
        }
        if self.penalty.is_nan() || self.penalty < 0.0 {
            return Err(ConfigError::NegativePenalty {
                penalty: self.penalty,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GroupingConfig {
    /// Minimum time-profile overlap for two events to share a meta-event.
    pub time_diff_ratio: f64,
    /// Minimum attendee Jaccard index for two events to share a meta-event.
    pub occ_diff_ratio: f64,
    /// Minimum attended-event Jaccard index for greedy person grouping.
    pub event_diff_ratio: f64,
    /// Agglomerative clustering stops at this average distance.
    pub cluster_distance_threshold: f64,
    pub person_grouping: PersonGrouping,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            time_diff_ratio: 0.8,
            occ_diff_ratio: 0.2,
            event_diff_ratio: 0.2,
            cluster_distance_threshold: 0.3,
            person_grouping: PersonGrouping::default(),
        }
    }
}

impl GroupingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("time-diff-ratio", self.time_diff_ratio),
            ("occ-diff-ratio", self.occ_diff_ratio),
            ("event-diff-ratio", self.event_diff_ratio),
            ("cluster-distance-threshold", self.cluster_distance_threshold),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

impl LearnerConfig {
    /// A configuration over `start..=end` with default parameters.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            spaces: vec![],
            segmentation: SegmentationConfig::default(),
            grouping: GroupingConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start > self.end {
            return Err(ConfigError::EmptyDateRange {
                start: self.start,
                end: self.end,
            });
        }
        self.segmentation.validate()?;
        self.grouping.validate()?;
        Ok(())
    }

    /// Every date of the configured range, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = LearnerConfig::new(date("2017-11-27"), date("2017-12-01"));
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.segmentation.series_len(), 288);
        assert_eq!(config.segmentation.min_size(), 6);
        assert_eq!(config.segmentation.jump, 1);
    }

    #[test]
    fn test_dates_are_inclusive() {
        let config = LearnerConfig::new(date("2017-11-30"), date("2017-12-02"));
        let dates = config.dates().collect::<Vec<_>>();
        assert_eq!(
            dates,
            vec![date("2017-11-30"), date("2017-12-01"), date("2017-12-02")]
        );
    }

    #[test]
    fn test_series_len_rounds_up() {
        let config = SegmentationConfig {
            unit: 7,
            ..SegmentationConfig::default()
        };
        assert_eq!(config.series_len(), 206);
    }

    mod validate {
        use super::*;

        #[test]
        fn test_reversed_dates() {
            let config = LearnerConfig::new(date("2017-12-01"), date("2017-11-27"));
            assert!(matches!(
                config.validate(),
                Err(ConfigError::EmptyDateRange { .. })
            ));
        }

        #[test]
        fn test_zero_unit() {
            let config = SegmentationConfig {
                unit: 0,
                ..SegmentationConfig::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::InvalidUnit { unit: 0 }));
        }

        #[test]
        fn test_validity_longer_than_a_day() {
            let config = SegmentationConfig {
                validity: u32::MAX,
                ..SegmentationConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidValidity { validity: u32::MAX })
            );
            let config = SegmentationConfig {
                validity: 24 * 60,
                ..SegmentationConfig::default()
            };
            assert_eq!(config.validate(), Ok(()));
        }

        #[test]
        fn test_min_size_must_fit_in_a_day() {
            let config = SegmentationConfig {
                unit: 60,
                time_thresh: 24 * 60,
                ..SegmentationConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::MinSizeTooLarge {
                    min_size: 24,
                    len: 24
                })
            );
        }

        #[test]
        fn test_ratio_bounds() {
            let config = GroupingConfig {
                occ_diff_ratio: 1.5,
                ..GroupingConfig::default()
            };
            assert_eq!(
                config.validate(),
                Err(ConfigError::RatioOutOfRange {
                    name: "occ-diff-ratio",
                    value: 1.5
                })
            );
        }
    }

    mod deserialize {
        use super::*;

        #[test]
        fn test_partial_config_uses_defaults() {
            let config: LearnerConfig = serde_json::from_str(
                r#"{
                    "start": "2017-11-27",
                    "end": "2017-12-01",
                    "occ-thresh": 5,
                    "smooth": "SMA",
                    "person-grouping": "greedy",
                    "spaces": ["ap-1", "ap-2"]
                }"#,
            )
            .unwrap();
            assert_eq!(config.segmentation.occ_thresh, 5.0);
            assert_eq!(config.segmentation.smooth, SmoothingKind::Simple);
            assert_eq!(config.segmentation.unit, 5);
            assert_eq!(config.grouping.person_grouping, PersonGrouping::Greedy);
            assert_eq!(config.grouping.time_diff_ratio, 0.8);
            assert_eq!(config.spaces.len(), 2);
        }

        #[test]
        fn test_missing_dates_rejected() {
            let result = serde_json::from_str::<LearnerConfig>(r#"{ "unit": 5 }"#);
            assert!(result.is_err());
        }
    }
}
