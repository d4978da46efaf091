//! Learning recurring events and the people who attend them.
//!
//! Given presence observations (a client seen at a space at some time), the
//! learner reconstructs:
//!
//! - **Events**: contiguous stretches of raised occupancy at one space on one
//!   day, found by change-point segmentation of the day's occupancy series
//! - **Meta-events**: groups of events of one space with overlapping times and
//!   attendees
//! - **People**: one attendance profile per observed client
//! - **Meta-people**: groups of people who attend the same events
//! - **Capacities**: how many members of each meta-person attend each event
//!   and, on average, each meta-event
//!
//! # Modules
//!
//! - [`config`]: Pipeline parameters and their validation
//! - [`observation`]: Observations and the [`ObservationSource`](observation::ObservationSource) trait
//! - [`occupancy`]: Occupancy series and smoothing
//! - [`segmentation`]: Event detection on one day at one space
//! - [`events`]: Event learning over a date range and meta-event formation
//! - [`people`]: Person derivation and meta-person grouping
//! - [`capacity`]: Capacity aggregation
//! - [`grouping`]: The greedy one-pass partition shared by both groupings
//! - [`learner`]: The full pipeline
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use scenlearn_learner::{
//!     Learner, LearnerConfig,
//!     config::SmoothingKind,
//!     observation::{Observation, ObservationTable},
//! };
//! use scenlearn_model::id::{ClientId, SpaceId};
//!
//! let start = NaiveDate::from_ymd_opt(2017, 11, 27).unwrap();
//! let end = NaiveDate::from_ymd_opt(2017, 11, 29).unwrap();
//!
//! let mut table = ObservationTable::new();
//! for date in start.iter_days().take(3) {
//!     for (minute, client) in [(0, "alice"), (1, "bob"), (2, "carol")] {
//!         let time = date.and_hms_opt(9, minute, 0).unwrap();
//!         table.insert(SpaceId::from("room"), Observation::new(time, ClientId::from(client)));
//!     }
//! }
//!
//! let mut config = LearnerConfig::new(start, end);
//! config.segmentation.smooth = SmoothingKind::None;
//! config.segmentation.time_thresh = 5;
//! config.segmentation.occ_thresh = 1.0;
//!
//! let model = Learner::new(config).unwrap().learn(&table).unwrap();
//! assert_eq!(model.events.len(), 3);
//! assert_eq!(model.meta_events.len(), 1);
//! assert_eq!(model.meta_people.len(), 1);
//! ```

pub use self::{
    config::LearnerConfig,
    learner::{LearnError, LearnedModel, Learner, Summary},
};

pub mod capacity;
pub mod config;
pub mod events;
pub mod grouping;
pub mod learner;
pub mod observation;
pub mod occupancy;
pub mod people;
pub mod segmentation;
