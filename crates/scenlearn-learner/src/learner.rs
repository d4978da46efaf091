//! The full learning pipeline
//!
//! [`Learner`] runs the stages in order over one configured date range:
//! events and meta-events first, then people and meta-people, and finally the
//! capacities that tie the two hierarchies together. Every run starts from
//! fresh id allocators, so ids in one [`LearnedModel`] start at 1.

use chrono::NaiveDate;
use scenlearn_model::{
    Event, MetaEvent, MetaPerson, Person,
    id::{IdAllocators, SpaceId},
    record::{EventRecord, MetaEventRecord, MetaPersonRecord, PersonRecord},
    time_profile::MergeError,
};
use scenlearn_stats::changepoint::SegmentationError;
use serde::Serialize;

use crate::{
    capacity,
    config::{ConfigError, LearnerConfig},
    events::EventLearner,
    observation::ObservationSource,
    people::PeopleLearner,
};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum LearnError {
    #[display("invalid configuration: {_0}")]
    Config(#[error(source)] ConfigError),
    #[display("failed to segment {space} on {date}: {source}")]
    Segmentation {
        date: NaiveDate,
        space: SpaceId,
        source: SegmentationError,
    },
    #[display("failed to merge time profiles: {_0}")]
    Merge(#[error(source)] MergeError),
    #[display("failed to read observations of {date}: {message}")]
    Source { date: NaiveDate, message: String },
}

impl From<ConfigError> for LearnError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<MergeError> for LearnError {
    fn from(err: MergeError) -> Self {
        Self::Merge(err)
    }
}

/// Number of entities of each kind in a learned model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Summary {
    pub meta_people: usize,
    pub meta_events: usize,
    pub people: usize,
    pub events: usize,
}

/// Everything learned from one date range.
#[derive(Debug, Clone)]
pub struct LearnedModel {
    pub events: Vec<Event>,
    pub meta_events: Vec<MetaEvent>,
    pub people: Vec<Person>,
    pub meta_people: Vec<MetaPerson>,
}

impl LearnedModel {
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            meta_people: self.meta_people.len(),
            meta_events: self.meta_events.len(),
            people: self.people.len(),
            events: self.events.len(),
        }
    }

    /// Records of every grouped event.
    #[must_use]
    pub fn event_records(&self) -> Vec<EventRecord<'_>> {
        self.events.iter().filter_map(EventRecord::from_event).collect()
    }

    #[must_use]
    pub fn meta_event_records(&self) -> Vec<MetaEventRecord<'_>> {
        self.meta_events.iter().map(MetaEventRecord::from).collect()
    }

    /// Records of every grouped person.
    #[must_use]
    pub fn person_records(&self) -> Vec<PersonRecord> {
        self.people
            .iter()
            .filter_map(PersonRecord::from_person)
            .collect()
    }

    #[must_use]
    pub fn meta_person_records(&self) -> Vec<MetaPersonRecord<'_>> {
        self.meta_people.iter().map(MetaPersonRecord::from).collect()
    }
}

/// Learns events and people from an observation source.
#[derive(Debug, Clone)]
pub struct Learner {
    config: LearnerConfig,
}

impl Learner {
    /// Creates a learner after validating `config`.
    pub fn new(config: LearnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    pub fn learn<S>(&self, source: &S) -> Result<LearnedModel, LearnError>
    where
        S: ObservationSource + ?Sized,
    {
        log::info!(
            "learning from {} to {}",
            self.config.start,
            self.config.end
        );
        let mut ids = IdAllocators::default();

        let (mut events, mut meta_events) =
            EventLearner::new(&self.config).learn(source, &mut ids)?;
        let (people, meta_people) =
            PeopleLearner::new(&self.config.grouping).learn(&events, &mut ids)?;
        capacity::assign_capacities(&mut events, &mut meta_events, &people);

        let model = LearnedModel {
            events,
            meta_events,
            people,
            meta_people,
        };
        let summary = model.summary();
        log::info!(
            "learned {} meta-people, {} meta-events, {} people, {} events",
            summary.meta_people,
            summary.meta_events,
            summary.people,
            summary.events,
        );
        Ok(model)
    }
}
