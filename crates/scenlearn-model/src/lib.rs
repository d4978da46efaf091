//! Domain model of the scenario learner.
//!
//! The learner turns presence observations into four kinds of entities:
//!
//! - [`Event`]: one occupancy episode at one space on one day
//! - [`MetaEvent`]: a group of similar events, usually one recurring meeting
//! - [`Person`]: the attendance profile of one observed client
//! - [`MetaPerson`]: a group of people with similar attendance
//!
//! Every entity carries a [`TimeProfile`](time_profile::TimeProfile) built
//! from [`PatDur`](time_profile::PatDur) patterns, and the grouped entities
//! point back at their group through an optional id that is assigned exactly
//! once, when the group is built.
//!
//! # Modules
//!
//! - [`id`]: Typed identities and their allocators
//! - [`time_profile`]: Statistical time-of-day patterns and their merge rules
//! - [`event`]: Events, meta-events and their capacities
//! - [`person`]: People and meta-people
//! - [`record`]: Serializable records of the learned model files
//!
//! # Examples
//!
//! ```
//! use std::collections::BTreeSet;
//!
//! use chrono::NaiveDate;
//! use scenlearn_model::{
//!     Event, MetaEvent,
//!     id::{ClientId, IdAllocators, SpaceId},
//!     time_profile::{PatDur, TimeProfile, TimeProfileEntry},
//! };
//! use scenlearn_stats::descriptive::MeanStd;
//!
//! let mut ids = IdAllocators::default();
//! let date = NaiveDate::from_ymd_opt(2017, 11, 28).unwrap();
//! let pattern = PatDur::basic(date, 540.0, 599.0, MeanStd::new(35.4, 5.9), 0);
//!
//! let mut event = Event::new(
//!     ids.events.allocate(),
//!     SpaceId::from("ap-1"),
//!     BTreeSet::from([ClientId::from("alice")]),
//!     TimeProfile::single(TimeProfileEntry::single(pattern)),
//! );
//! assert!(event.meta_event().is_none());
//!
//! let meta_event = MetaEvent::from_events(ids.meta_events.allocate(), vec![&mut event]).unwrap();
//! assert_eq!(event.meta_event(), Some(meta_event.id()));
//! ```

pub use self::{
    event::{Event, EventCapacity, MetaEvent, MetaEventCapacity},
    person::{MetaPerson, Person},
};

pub mod event;
pub mod id;
pub mod person;
pub mod record;
pub mod time_profile;
