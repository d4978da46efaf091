//! People learning
//!
//! People are derived by inverting the attendee sets of the learned events:
//! every client seen at any event becomes one [`Person`]. People are then
//! grouped into meta-people by how much their attended events overlap.

use std::collections::BTreeMap;

use scenlearn_model::{
    Event, MetaPerson, Person,
    id::{ClientId, IdAllocators},
};
use scenlearn_stats::{
    clustering::{AverageLinkage, DistanceMatrix},
    similarity::{jaccard_distance, jaccard_index},
};

use crate::{
    config::{GroupingConfig, PersonGrouping},
    grouping::{greedy_partition, pick_mut},
    learner::LearnError,
};

/// People with no attended event in common are never grouped together.
const DISJOINT_DISTANCE: f64 = 1.0;

/// Builds one person per distinct attendee of `events`, in client order.
pub fn derive_people(events: &[Event], ids: &mut IdAllocators) -> Result<Vec<Person>, LearnError> {
    let mut attended = BTreeMap::<&ClientId, Vec<&Event>>::new();
    for event in events {
        for client in event.attendees() {
            attended.entry(client).or_default().push(event);
        }
    }

    let mut people = Vec::with_capacity(attended.len());
    for (client, events) in attended {
        let person = Person::from_events(ids.people.allocate(), client.clone(), events)?;
        people.push(person);
    }
    Ok(people)
}

/// Partitions `people` into groups (indices into `people`).
#[must_use]
pub fn group_people(people: &[Person], config: &GroupingConfig) -> Vec<Vec<usize>> {
    match config.person_grouping {
        PersonGrouping::Agglomerative => {
            let distances = DistanceMatrix::from_fn(people.len(), |i, j| {
                jaccard_distance(people[i].events(), people[j].events())
            });
            AverageLinkage::new(config.cluster_distance_threshold)
                .with_cannot_link_distance(DISJOINT_DISTANCE)
                .cluster(&distances)
        }
        PersonGrouping::Greedy => greedy_partition(people, |seed, candidate| {
            let similarity = jaccard_index(seed.events(), candidate.events());
            similarity > 0.0 && similarity >= config.event_diff_ratio
        }),
    }
}

/// Derives people from learned events and groups them into meta-people.
#[derive(Debug)]
pub struct PeopleLearner<'a> {
    config: &'a GroupingConfig,
}

impl<'a> PeopleLearner<'a> {
    #[must_use]
    pub fn new(config: &'a GroupingConfig) -> Self {
        Self { config }
    }

    pub fn learn(
        &self,
        events: &[Event],
        ids: &mut IdAllocators,
    ) -> Result<(Vec<Person>, Vec<MetaPerson>), LearnError> {
        let mut people = derive_people(events, ids)?;
        let groups = group_people(&people, self.config);

        let mut meta_people = Vec::with_capacity(groups.len());
        for group in groups {
            let id = ids.meta_people.allocate();
            let meta_person = MetaPerson::from_people(id, pick_mut(&mut people, &group))?;
            log::debug!(
                "meta-person {}: {} people, affinity {:?}",
                meta_person.id(),
                meta_person.probability(),
                meta_person.event_affinity(),
            );
            meta_people.push(meta_person);
        }
        log::info!(
            "grouped {} people into {} meta-people",
            people.len(),
            meta_people.len()
        );
        Ok((people, meta_people))
    }
}
