//! People and meta-people
//!
//! A [`Person`] is the attendance profile of one client: which events it was
//! seen at, how often per meta-event, and the merged time pattern of those
//! events. A [`MetaPerson`] groups people with similar attendance.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    event::Event,
    id::{ClientId, EventId, MetaEventId, MetaPersonId, PersonId},
    time_profile::{MergeError, TimeProfile},
};

#[derive(Debug, Clone)]
pub struct Person {
    id: PersonId,
    client: ClientId,
    time_profile: TimeProfile,
    meta_event_counts: BTreeMap<Option<MetaEventId>, usize>,
    events: BTreeSet<EventId>,
    meta_person: Option<MetaPersonId>,
}

impl Person {
    /// Derives the profile of `client` from the events it attended.
    ///
    /// Events not yet grouped into a meta-event are tallied under `None`.
    pub fn from_events<'a, I>(id: PersonId, client: ClientId, events: I) -> Result<Self, MergeError>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let events = events.into_iter().collect::<Vec<_>>();
        let time_profile = TimeProfile::merged(events.iter().map(|e| e.time_profile()))?;

        let mut meta_event_counts = BTreeMap::<Option<MetaEventId>, usize>::new();
        for event in &events {
            *meta_event_counts.entry(event.meta_event()).or_default() += 1;
        }

        Ok(Self {
            id,
            client,
            time_profile,
            meta_event_counts,
            events: events.iter().map(|e| e.id()).collect(),
            meta_person: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> PersonId {
        self.id
    }

    #[must_use]
    pub fn client(&self) -> &ClientId {
        &self.client
    }

    #[must_use]
    pub fn time_profile(&self) -> &TimeProfile {
        &self.time_profile
    }

    /// Number of attended events per meta-event, including ungrouped events
    /// under `None`.
    #[must_use]
    pub fn meta_event_counts(&self) -> &BTreeMap<Option<MetaEventId>, usize> {
        &self.meta_event_counts
    }

    #[must_use]
    pub fn events(&self) -> &BTreeSet<EventId> {
        &self.events
    }

    #[must_use]
    pub fn attended(&self, event: EventId) -> bool {
        self.events.contains(&event)
    }

    #[must_use]
    pub fn meta_person(&self) -> Option<MetaPersonId> {
        self.meta_person
    }
}

#[derive(Debug, Clone)]
pub struct MetaPerson {
    id: MetaPersonId,
    time_profile: TimeProfile,
    event_affinity: BTreeMap<MetaEventId, usize>,
    people: Vec<PersonId>,
}

impl MetaPerson {
    /// Builds a meta-person from its constituent people and assigns `id` to
    /// each of them.
    ///
    /// # Panics
    ///
    /// Panics if one of `people` already belongs to a meta-person.
    pub fn from_people(id: MetaPersonId, people: Vec<&mut Person>) -> Result<Self, MergeError> {
        let time_profile = TimeProfile::merged(people.iter().map(|p| &p.time_profile))?;

        let mut event_affinity = BTreeMap::<MetaEventId, usize>::new();
        for person in &people {
            for (meta_event, count) in &person.meta_event_counts {
                if let Some(meta_event) = meta_event {
                    *event_affinity.entry(*meta_event).or_default() += count;
                }
            }
        }
        let person_ids = people.iter().map(|p| p.id).collect();

        for person in people {
            assert!(
                person.meta_person.is_none(),
                "person {} already belongs to meta-person",
                person.id
            );
            person.meta_person = Some(id);
        }

        Ok(Self {
            id,
            time_profile,
            event_affinity,
            people: person_ids,
        })
    }

    #[must_use]
    pub fn id(&self) -> MetaPersonId {
        self.id
    }

    #[must_use]
    pub fn time_profile(&self) -> &TimeProfile {
        &self.time_profile
    }

    /// Occurrence weight: the number of constituent people.
    #[must_use]
    pub fn probability(&self) -> usize {
        self.people.len()
    }

    /// Attendance count per meta-event, summed over the constituent people.
    #[must_use]
    pub fn event_affinity(&self) -> &BTreeMap<MetaEventId, usize> {
        &self.event_affinity
    }

    #[must_use]
    pub fn people(&self) -> &[PersonId] {
        &self.people
    }
}
