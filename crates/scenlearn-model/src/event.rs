//! Events and meta-events
//!
//! An [`Event`] is one detected occupancy episode at one space on one day.
//! Its attendees and time profile are fixed when it is detected; the
//! meta-event it belongs to and its per-meta-person capacity are filled in by
//! later stages, each exactly once.
//!
//! A [`MetaEvent`] is a group of similar events, typically the same recurring
//! meeting observed on many days. Building one from its events stamps the
//! meta-event id onto every constituent event.

use std::collections::BTreeSet;

use scenlearn_stats::descriptive::MeanStd;

use crate::{
    id::{ClientId, EventId, MetaEventId, MetaPersonId, SpaceId},
    time_profile::{MergeError, TimeProfile},
};

/// Attendance of one meta-person at one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCapacity {
    pub meta_person: MetaPersonId,
    /// Number of attendees of the event belonging to `meta_person`.
    pub count: usize,
}

/// Expected attendance of one meta-person at a meta-event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetaEventCapacity {
    pub meta_person: MetaPersonId,
    /// Attendance counts of `meta_person` across the constituent events.
    pub attendance: MeanStd,
}

#[derive(Debug, Clone)]
pub struct Event {
    id: EventId,
    space: SpaceId,
    attendees: BTreeSet<ClientId>,
    time_profile: TimeProfile,
    meta_event: Option<MetaEventId>,
    capacity: Option<Vec<EventCapacity>>,
}

impl Event {
    #[must_use]
    pub fn new(
        id: EventId,
        space: SpaceId,
        attendees: BTreeSet<ClientId>,
        time_profile: TimeProfile,
    ) -> Self {
        Self {
            id,
            space,
            attendees,
            time_profile,
            meta_event: None,
            capacity: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn space(&self) -> &SpaceId {
        &self.space
    }

    #[must_use]
    pub fn attendees(&self) -> &BTreeSet<ClientId> {
        &self.attendees
    }

    #[must_use]
    pub fn time_profile(&self) -> &TimeProfile {
        &self.time_profile
    }

    /// The meta-event this event was grouped into, `None` until grouping.
    #[must_use]
    pub fn meta_event(&self) -> Option<MetaEventId> {
        self.meta_event
    }

    #[must_use]
    pub fn capacity(&self) -> Option<&[EventCapacity]> {
        self.capacity.as_deref()
    }

    /// Records the per-meta-person attendance of this event.
    ///
    /// # Panics
    ///
    /// Panics if the capacity was already set.
    pub fn set_capacity(&mut self, capacity: Vec<EventCapacity>) {
        assert!(
            self.capacity.is_none(),
            "capacity of event {} already set",
            self.id
        );
        self.capacity = Some(capacity);
    }
}

#[derive(Debug, Clone)]
pub struct MetaEvent {
    id: MetaEventId,
    spaces: BTreeSet<SpaceId>,
    time_profile: TimeProfile,
    probability: f64,
    events: Vec<EventId>,
    capacity: Option<Vec<MetaEventCapacity>>,
}

impl MetaEvent {
    /// Builds a meta-event from its constituent events and assigns `id` to
    /// each of them.
    ///
    /// The time profile is the merge of every pattern of every event. Nothing
    /// is modified when the merge fails.
    ///
    /// # Panics
    ///
    /// Panics if one of `events` already belongs to a meta-event.
    pub fn from_events(id: MetaEventId, events: Vec<&mut Event>) -> Result<Self, MergeError> {
        let time_profile = TimeProfile::merged(events.iter().map(|e| &e.time_profile))?;
        let spaces = events.iter().map(|e| e.space.clone()).collect();
        let event_ids = events.iter().map(|e| e.id).collect();

        for event in events {
            assert!(
                event.meta_event.is_none(),
                "event {} already belongs to meta-event",
                event.id
            );
            event.meta_event = Some(id);
        }

        Ok(Self {
            id,
            spaces,
            time_profile,
            probability: 1.0,
            events: event_ids,
            capacity: None,
        })
    }

    #[must_use]
    pub fn id(&self) -> MetaEventId {
        self.id
    }

    #[must_use]
    pub fn spaces(&self) -> &BTreeSet<SpaceId> {
        &self.spaces
    }

    #[must_use]
    pub fn time_profile(&self) -> &TimeProfile {
        &self.time_profile
    }

    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    #[must_use]
    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    #[must_use]
    pub fn capacity(&self) -> Option<&[MetaEventCapacity]> {
        self.capacity.as_deref()
    }

    /// Records the expected per-meta-person attendance.
    ///
    /// # Panics
    ///
    /// Panics if the capacity was already set.
    pub fn set_capacity(&mut self, capacity: Vec<MetaEventCapacity>) {
        assert!(
            self.capacity.is_none(),
            "capacity of meta-event {} already set",
            self.id
        );
        self.capacity = Some(capacity);
    }
}
