//! Capacity aggregation
//!
//! Once events and people are both grouped, every event records how many of
//! its attendees belong to each meta-person, and every meta-event summarizes
//! those counts over its constituent events. Only events where a meta-person
//! was present contribute to that meta-person's summary.

use std::collections::BTreeMap;

use scenlearn_model::{
    Event, EventCapacity, MetaEvent, MetaEventCapacity, Person,
    id::{EventId, MetaPersonId},
};
use scenlearn_stats::descriptive::MeanStd;

/// Number of attendees per meta-person, for every event someone attended.
///
/// People without a meta-person are not counted.
#[must_use]
pub fn attendance_by_event(people: &[Person]) -> BTreeMap<EventId, BTreeMap<MetaPersonId, usize>> {
    let mut attendance = BTreeMap::<EventId, BTreeMap<MetaPersonId, usize>>::new();
    for person in people {
        let Some(meta_person) = person.meta_person() else {
            continue;
        };
        for &event in person.events() {
            *attendance
                .entry(event)
                .or_default()
                .entry(meta_person)
                .or_default() += 1;
        }
    }
    attendance
}

/// Sets the capacity of every event and meta-event.
///
/// # Panics
///
/// Panics if a capacity was already set.
pub fn assign_capacities(events: &mut [Event], meta_events: &mut [MetaEvent], people: &[Person]) {
    let attendance = attendance_by_event(people);

    for event in events.iter_mut() {
        let capacity = attendance
            .get(&event.id())
            .into_iter()
            .flatten()
            .map(|(&meta_person, &count)| EventCapacity { meta_person, count })
            .collect();
        event.set_capacity(capacity);
    }

    for meta_event in meta_events {
        let mut counts = BTreeMap::<MetaPersonId, Vec<f64>>::new();
        for event in meta_event.events() {
            for (&meta_person, &count) in attendance.get(event).into_iter().flatten() {
                #[expect(clippy::cast_precision_loss)]
                counts.entry(meta_person).or_default().push(count as f64);
            }
        }
        let capacity = counts
            .into_iter()
            .filter_map(|(meta_person, counts)| {
                let attendance = MeanStd::from_values(counts)?;
                Some(MetaEventCapacity {
                    meta_person,
                    attendance,
                })
            })
            .collect();
        meta_event.set_capacity(capacity);
    }
}
