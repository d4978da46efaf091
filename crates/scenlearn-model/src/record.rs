//! Serializable output records
//!
//! The learned model is written as four independent collections. Each record
//! type borrows from the entity it describes and serializes with the
//! kebab-case field names of the model files.

use serde::Serialize;

use crate::{
    event::{Event, EventCapacity, MetaEvent, MetaEventCapacity},
    id::{EventId, MetaEventId, MetaPersonId, PersonId, SpaceId},
    person::{MetaPerson, Person},
    time_profile::TimeProfile,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventRecord<'a> {
    pub id: EventId,
    pub metaevent_id: MetaEventId,
    pub profile_index: usize,
    pub space_ids: [&'a SpaceId; 1],
    pub capacity: Option<Vec<EventCapacityRecord>>,
}

impl<'a> EventRecord<'a> {
    /// The record of `event`, or `None` when it was never grouped.
    #[must_use]
    pub fn from_event(event: &'a Event) -> Option<Self> {
        Some(Self {
            id: event.id(),
            metaevent_id: event.meta_event()?,
            profile_index: 0,
            space_ids: [event.space()],
            capacity: event
                .capacity()
                .map(|capacity| capacity.iter().map(EventCapacityRecord::from).collect()),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventCapacityRecord {
    pub metapeople_id: MetaPersonId,
    pub range: [usize; 2],
}

impl From<&EventCapacity> for EventCapacityRecord {
    fn from(capacity: &EventCapacity) -> Self {
        Self {
            metapeople_id: capacity.meta_person,
            range: [0, capacity.count],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetaEventRecord<'a> {
    pub id: MetaEventId,
    pub probability: f64,
    pub spaces: SpacesRecord<'a>,
    pub time_profiles: &'a TimeProfile,
    pub capacity: Option<Vec<MetaEventCapacityRecord>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SpacesRecord<'a> {
    pub space_ids: Vec<&'a SpaceId>,
    pub number: usize,
}

impl<'a> From<&'a MetaEvent> for MetaEventRecord<'a> {
    fn from(meta_event: &'a MetaEvent) -> Self {
        let space_ids = meta_event.spaces().iter().collect::<Vec<_>>();
        Self {
            id: meta_event.id(),
            probability: meta_event.probability(),
            spaces: SpacesRecord {
                number: space_ids.len(),
                space_ids,
            },
            time_profiles: meta_event.time_profile(),
            capacity: meta_event
                .capacity()
                .map(|capacity| capacity.iter().map(MetaEventCapacityRecord::from).collect()),
        }
    }
}

/// Expected attendance bounds: `lo` is always `[0, 0]`, `hi` is the rounded-up
/// `[mean, std]` of the attendance counts.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetaEventCapacityRecord {
    pub metapeople_id: MetaPersonId,
    pub lo: [u64; 2],
    pub hi: [u64; 2],
}

impl From<&MetaEventCapacity> for MetaEventCapacityRecord {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from(capacity: &MetaEventCapacity) -> Self {
        let hi = capacity.attendance.ceil();
        Self {
            metapeople_id: capacity.meta_person,
            lo: [0, 0],
            hi: [hi.mean.max(0.0) as u64, hi.std_dev.max(0.0) as u64],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PersonRecord {
    pub id: PersonId,
    pub metaperson_id: MetaPersonId,
    pub profile_index: usize,
}

impl PersonRecord {
    /// The record of `person`, or `None` when it was never grouped.
    #[must_use]
    pub fn from_person(person: &Person) -> Option<Self> {
        Some(Self {
            id: person.id(),
            metaperson_id: person.meta_person()?,
            profile_index: 0,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetaPersonRecord<'a> {
    pub id: MetaPersonId,
    pub probability: usize,
    pub time_profiles: &'a TimeProfile,
    pub event_affinity: Vec<AffinityRecord>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AffinityRecord {
    pub metaevent_id: MetaEventId,
    pub probability: usize,
}

impl<'a> From<&'a MetaPerson> for MetaPersonRecord<'a> {
    fn from(meta_person: &'a MetaPerson) -> Self {
        Self {
            id: meta_person.id(),
            probability: meta_person.probability(),
            time_profiles: meta_person.time_profile(),
            event_affinity: meta_person
                .event_affinity()
                .iter()
                .map(|(&metaevent_id, &probability)| AffinityRecord {
                    metaevent_id,
                    probability,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;
    use scenlearn_stats::descriptive::MeanStd;
    use serde_json::json;

    use super::*;
    use crate::{
        id::ClientId,
        time_profile::{PatDur, TimeProfileEntry},
    };

    fn event(id: u64) -> Event {
        let date = NaiveDate::from_ymd_opt(2017, 11, 28).unwrap();
        let pattern = PatDur::basic(date, 540.0, 599.0, MeanStd::new(35.4, 5.9), 0);
        Event::new(
            EventId::from(id),
            SpaceId::from("ap-1"),
            BTreeSet::from([ClientId::from("x")]),
            TimeProfile::single(TimeProfileEntry::single(pattern)),
        )
    }

    #[test]
    fn test_ungrouped_event_has_no_record() {
        assert!(EventRecord::from_event(&event(1)).is_none());
    }

    #[test]
    fn test_event_record_layout() {
        let mut e = event(4);
        MetaEvent::from_events(MetaEventId::from(2), vec![&mut e]).unwrap();
        e.set_capacity(vec![EventCapacity {
            meta_person: MetaPersonId::from(3),
            count: 5,
        }]);

        let value = serde_json::to_value(EventRecord::from_event(&e).unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 4,
                "metaevent-id": 2,
                "profile-index": 0,
                "space-ids": ["ap-1"],
                "capacity": [{ "metapeople-id": 3, "range": [0, 5] }]
            })
        );
    }

    #[test]
    fn test_meta_event_record_layout() {
        let mut e = event(4);
        let mut meta = MetaEvent::from_events(MetaEventId::from(2), vec![&mut e]).unwrap();
        meta.set_capacity(vec![MetaEventCapacity {
            meta_person: MetaPersonId::from(3),
            attendance: MeanStd::new(2.5, 0.5),
        }]);

        let value = serde_json::to_value(MetaEventRecord::from(&meta)).unwrap();
        assert_eq!(value["id"], json!(2));
        assert_eq!(value["probability"], json!(1.0));
        assert_eq!(
            value["spaces"],
            json!({ "space-ids": ["ap-1"], "number": 1 })
        );
        assert_eq!(value["time-profiles"][0]["probability"], json!(1.0));
        assert_eq!(
            value["capacity"],
            json!([{ "metapeople-id": 3, "lo": [0, 0], "hi": [3, 1] }])
        );
    }

    #[test]
    fn test_person_records() {
        let mut e = event(1);
        MetaEvent::from_events(MetaEventId::from(1), vec![&mut e]).unwrap();
        let mut p = Person::from_events(PersonId::from(6), ClientId::from("x"), [&e]).unwrap();
        assert!(PersonRecord::from_person(&p).is_none());

        let meta = MetaPerson::from_people(MetaPersonId::from(8), vec![&mut p]).unwrap();
        assert_eq!(
            serde_json::to_value(PersonRecord::from_person(&p).unwrap()).unwrap(),
            json!({ "id": 6, "metaperson-id": 8, "profile-index": 0 })
        );

        let value = serde_json::to_value(MetaPersonRecord::from(&meta)).unwrap();
        assert_eq!(value["id"], json!(8));
        assert_eq!(value["probability"], json!(1));
        assert_eq!(
            value["event-affinity"],
            json!([{ "metaevent-id": 1, "probability": 1 }])
        );
    }
}
