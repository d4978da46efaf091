//! Event learning
//!
//! Runs segmentation for every configured space on every day of the range,
//! gives the detected events their identities, and groups the events of each
//! space into meta-events.
//!
//! Within one day the spaces are segmented in parallel. Identities are handed
//! out afterwards, in space order, so the result does not depend on thread
//! scheduling.

use std::{collections::BTreeMap, iter, thread};

use chrono::NaiveDate;
use scenlearn_model::{
    Event, MetaEvent,
    id::{IdAllocators, SpaceId},
    time_profile::TimeProfileEntry,
};
use scenlearn_stats::similarity::jaccard_index;

use crate::{
    config::{GroupingConfig, LearnerConfig},
    grouping::{greedy_partition, pick_mut},
    learner::LearnError,
    observation::{Observation, ObservationSource},
    segmentation::{self, DaySegmentation, DetectedEvent},
};

/// Whether `candidate` belongs in the meta-event seeded by `seed`.
#[must_use]
pub fn events_similar(seed: &Event, candidate: &Event, config: &GroupingConfig) -> bool {
    let time_overlap = match (seed.time_profile().primary(), candidate.time_profile().primary()) {
        (Some(a), Some(b)) => TimeProfileEntry::diff(a, b),
        _ => 0.0,
    };
    time_overlap >= config.time_diff_ratio
        && jaccard_index(seed.attendees(), candidate.attendees()) >= config.occ_diff_ratio
}

/// Greedily partitions `events` into groups of similar events (indices into
/// `events`).
#[must_use]
pub fn group_events(events: &[Event], config: &GroupingConfig) -> Vec<Vec<usize>> {
    greedy_partition(events, |seed, candidate| {
        events_similar(seed, candidate, config)
    })
}

/// Spaces to segment on a day: the configured list, or every observed space
/// when none is configured.
fn spaces_for_day<'a>(
    config: &'a LearnerConfig,
    day: &'a BTreeMap<SpaceId, Vec<Observation>>,
) -> Vec<&'a SpaceId> {
    if config.spaces.is_empty() {
        day.keys().collect()
    } else {
        config.spaces.iter().collect()
    }
}

/// Segments every space of one day, one thread per space.
///
/// The results are in the order of `spaces`.
pub fn segment_spaces(
    date: NaiveDate,
    spaces: &[&SpaceId],
    day: &BTreeMap<SpaceId, Vec<Observation>>,
    config: &LearnerConfig,
) -> Result<Vec<DaySegmentation>, LearnError> {
    let mut results = spaces.iter().map(|_| None).collect::<Vec<_>>();
    thread::scope(|s| {
        for (&space, slot) in iter::zip(spaces, &mut results) {
            let observations = day.get(space).map_or(&[][..], Vec::as_slice);
            let config = &config.segmentation;
            s.spawn(move || {
                *slot = Some(segmentation::segment_day(date, space, observations, config));
            });
        }
    });

    iter::zip(spaces, results)
        .filter_map(|(space, result)| Some((space, result?)))
        .map(|(space, result)| {
            result.map_err(|source| LearnError::Segmentation {
                date,
                space: (*space).clone(),
                source,
            })
        })
        .collect()
}

/// Learns the events of the configured date range and groups them into
/// meta-events.
#[derive(Debug)]
pub struct EventLearner<'a> {
    config: &'a LearnerConfig,
}

impl<'a> EventLearner<'a> {
    #[must_use]
    pub fn new(config: &'a LearnerConfig) -> Self {
        Self { config }
    }

    /// Detects the events of one day and gives them identities.
    pub fn learn_day(
        &self,
        date: NaiveDate,
        day: &BTreeMap<SpaceId, Vec<Observation>>,
        ids: &mut IdAllocators,
    ) -> Result<Vec<Event>, LearnError> {
        let spaces = spaces_for_day(self.config, day);
        for space in &spaces {
            if !day.contains_key(*space) {
                log::warn!("no observations at {space} on {date}");
            }
        }

        let segmentations = segment_spaces(date, &spaces, day, self.config)?;
        let events = segmentations
            .into_iter()
            .flat_map(|segmentation| segmentation.events)
            .map(|detected| {
                let DetectedEvent {
                    space,
                    segment,
                    attendees,
                    time_profile,
                } = detected;
                let event = Event::new(ids.events.allocate(), space, attendees, time_profile);
                log::debug!(
                    "event {} at {} on {date}: minutes {}..={}, mean occupancy {:.1}, {} attendees",
                    event.id(),
                    event.space(),
                    segment.start_minute,
                    segment.end_minute,
                    segment.occupancy.mean,
                    event.attendees().len(),
                );
                event
            })
            .collect::<Vec<_>>();
        Ok(events)
    }

    /// Learns events over every day of the range and forms the meta-events.
    ///
    /// Returns all events (grouped, in id order) and the meta-events.
    pub fn learn<S>(
        &self,
        source: &S,
        ids: &mut IdAllocators,
    ) -> Result<(Vec<Event>, Vec<MetaEvent>), LearnError>
    where
        S: ObservationSource + ?Sized,
    {
        let mut by_space = Vec::<(SpaceId, Vec<Event>)>::new();
        for date in self.config.dates() {
            let day = source
                .observations_on(date)
                .map_err(|err| LearnError::Source {
                    date,
                    message: err.to_string(),
                })?;
            let events = self.learn_day(date, &day, ids)?;
            log::info!("{date}: {} events", events.len());

            for event in events {
                match by_space.iter_mut().find(|(space, _)| space == event.space()) {
                    Some((_, list)) => list.push(event),
                    None => by_space.push((event.space().clone(), vec![event])),
                }
            }
        }

        let mut meta_events = vec![];
        for (_, events) in &mut by_space {
            meta_events.extend(self.form_meta_events(events, ids)?);
        }

        let mut events = by_space
            .into_iter()
            .flat_map(|(_, events)| events)
            .collect::<Vec<_>>();
        events.sort_unstable_by_key(Event::id);
        log::info!(
            "grouped {} events into {} meta-events",
            events.len(),
            meta_events.len()
        );
        Ok((events, meta_events))
    }

    /// Groups the events of one space and builds a meta-event per group.
    pub fn form_meta_events(
        &self,
        events: &mut [Event],
        ids: &mut IdAllocators,
    ) -> Result<Vec<MetaEvent>, LearnError> {
        let groups = group_events(events, &self.config.grouping);
        let mut meta_events = Vec::with_capacity(groups.len());
        for group in groups {
            let id = ids.meta_events.allocate();
            let meta_event = MetaEvent::from_events(id, pick_mut(events, &group))?;
            log::debug!(
                "meta-event {}: {} events at {:?}",
                meta_event.id(),
                meta_event.events().len(),
                meta_event.spaces(),
            );
            meta_events.push(meta_event);
        }
        Ok(meta_events)
    }
}
