//! Identities
//!
//! Learned entities carry numeric ids drawn from an [`IdAllocator`] owned by
//! the learning run, so two runs in one process never share counters and ids
//! are never reused within a run. Spaces and clients keep the string ids they
//! have in the observation data.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, derive_more::Display, derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }
    };
}

numeric_id!(
    /// Identity of a detected [`Event`](crate::Event).
    EventId
);
numeric_id!(
    /// Identity of a [`MetaEvent`](crate::MetaEvent).
    MetaEventId
);
numeric_id!(
    /// Identity of a [`Person`](crate::Person).
    PersonId
);
numeric_id!(
    /// Identity of a [`MetaPerson`](crate::MetaPerson).
    MetaPersonId
);

/// Identifier of a physical location (e.g. a WiFi access point).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct SpaceId(String);

impl SpaceId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SpaceId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Identifier of an observed entity (a device or user).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Monotonic id source for one entity type. The first id handed out is `1`.
#[derive(Debug, Clone)]
pub struct IdAllocator<T> {
    next: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for IdAllocator<T> {
    fn default() -> Self {
        Self {
            next: 1,
            _marker: PhantomData,
        }
    }
}

impl<T> IdAllocator<T>
where
    T: From<u64>,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> T {
        let id = self.next;
        self.next += 1;
        T::from(id)
    }
}

/// One allocator per learned entity type.
#[derive(Debug, Clone, Default)]
pub struct IdAllocators {
    pub events: IdAllocator<EventId>,
    pub meta_events: IdAllocator<MetaEventId>,
    pub people: IdAllocator<PersonId>,
    pub meta_people: IdAllocator<MetaPersonId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_starts_at_one_and_increments() {
        let mut ids = IdAllocator::<EventId>::new();
        assert_eq!(ids.allocate(), EventId::from(1));
        assert_eq!(ids.allocate(), EventId::from(2));
        assert_eq!(ids.allocate().get(), 3);
    }

    #[test]
    fn test_allocators_are_independent() {
        let mut ids = IdAllocators::default();
        ids.events.allocate();
        ids.events.allocate();
        assert_eq!(ids.meta_events.allocate(), MetaEventId::from(1));
        assert_eq!(ids.people.allocate(), PersonId::from(1));
    }

    #[test]
    fn test_ids_serialize_transparently() {
        assert_eq!(serde_json::to_string(&PersonId::from(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&SpaceId::from("ap-1")).unwrap(),
            "\"ap-1\""
        );
    }
}
