//! Presence observations and where they come from

use std::{collections::BTreeMap, convert::Infallible};

use chrono::{NaiveDate, NaiveDateTime, Timelike as _};
use scenlearn_model::id::{ClientId, SpaceId};

/// A client seen at a space at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Observation {
    pub time: NaiveDateTime,
    pub client: ClientId,
}

impl Observation {
    #[must_use]
    pub fn new(time: NaiveDateTime, client: ClientId) -> Self {
        Self { time, client }
    }

    /// Whole minutes after midnight; seconds are dropped.
    #[must_use]
    pub fn minute_of_day(&self) -> u32 {
        self.time.hour() * 60 + self.time.minute()
    }

    /// Seconds after midnight; sub-second precision is dropped.
    #[must_use]
    pub fn second_of_day(&self) -> u32 {
        self.time.num_seconds_from_midnight()
    }
}

/// Supplies the observations of one calendar day, grouped by space.
///
/// Every returned observation must be timestamped on `date`.
pub trait ObservationSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn observations_on(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<SpaceId, Vec<Observation>>, Self::Error>;
}

/// An in-memory table of observations indexed by day and space.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    days: BTreeMap<NaiveDate, BTreeMap<SpaceId, Vec<Observation>>>,
}

impl ObservationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, space: SpaceId, observation: Observation) {
        self.days
            .entry(observation.time.date())
            .or_default()
            .entry(space)
            .or_default()
            .push(observation);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.days
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every space with at least one observation.
    #[must_use]
    pub fn spaces(&self) -> Vec<SpaceId> {
        let mut spaces = self
            .days
            .values()
            .flat_map(BTreeMap::keys)
            .cloned()
            .collect::<Vec<_>>();
        spaces.sort_unstable();
        spaces.dedup();
        spaces
    }
}

impl FromIterator<(SpaceId, Observation)> for ObservationTable {
    fn from_iter<T: IntoIterator<Item = (SpaceId, Observation)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (space, observation) in iter {
            table.insert(space, observation);
        }
        table
    }
}

impl ObservationSource for ObservationTable {
    type Error = Infallible;

    fn observations_on(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<SpaceId, Vec<Observation>>, Self::Error> {
        Ok(self.days.get(&date).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_time_of_day() {
        let obs = Observation::new(at("2017-11-28 09:02:59"), ClientId::from("a"));
        assert_eq!(obs.minute_of_day(), 542);
        assert_eq!(obs.second_of_day(), 542 * 60 + 59);
    }

    #[test]
    fn test_table_groups_by_day_and_space() {
        let table = [
            ("ap-1", "2017-11-28 09:00:00", "a"),
            ("ap-2", "2017-11-28 10:00:00", "b"),
            ("ap-1", "2017-11-29 09:00:00", "c"),
            ("ap-1", "2017-11-28 11:00:00", "d"),
        ]
        .into_iter()
        .map(|(space, time, client)| {
            (
                SpaceId::from(space),
                Observation::new(at(time), ClientId::from(client)),
            )
        })
        .collect::<ObservationTable>();

        assert_eq!(table.len(), 4);
        assert_eq!(
            table.spaces(),
            vec![SpaceId::from("ap-1"), SpaceId::from("ap-2")]
        );
        let day = table
            .observations_on(NaiveDate::from_ymd_opt(2017, 11, 28).unwrap())
            .unwrap();
        assert_eq!(day[&SpaceId::from("ap-1")].len(), 2);
        assert_eq!(day[&SpaceId::from("ap-2")].len(), 1);
    }

    #[test]
    fn test_day_without_observations() {
        let table = ObservationTable::new();
        let day = table
            .observations_on(NaiveDate::from_ymd_opt(2017, 11, 28).unwrap())
            .unwrap();
        assert!(day.is_empty());
        assert!(table.is_empty());
    }
}
