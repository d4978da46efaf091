use std::path::PathBuf;

use chrono::{Datelike as _, NaiveDate, NaiveTime, TimeDelta, Weekday};
use rand::{Rng, SeedableRng as _, seq::IndexedRandom as _};
use rand_distr::{Distribution as _, Normal};
use rand_pcg::Pcg32;
use scenlearn_learner::observation::Observation;
use scenlearn_model::id::{ClientId, SpaceId};

use crate::util::{self, Output};

/// Minutes between two sightings of a present client.
const SIGHTING_INTERVAL: i64 = 5;
const EARLIEST_START: u32 = 8 * 60;
const LATEST_START: u32 = 17 * 60;
const START_GRID: u32 = 15;
const MIN_DURATION: u32 = 30;
const MAX_DURATION: u32 = 120;
const MIN_ATTENDEES: usize = 3;
const MAX_ATTENDEES: usize = 10;
const WORKDAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateObservationsArg {
    /// First day to generate (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,
    /// Number of days to generate
    #[arg(long, default_value_t = 14)]
    days: u32,
    /// Number of weekly meetings
    #[arg(long, default_value_t = 5)]
    meetings: usize,
    /// Number of distinct clients
    #[arg(long, default_value_t = 40)]
    clients: usize,
    /// Number of spaces the meetings are spread over
    #[arg(long, default_value_t = 3)]
    spaces: usize,
    /// Standard deviation of arrival and departure times, in minutes
    #[arg(long, default_value_t = 5.0)]
    jitter: f64,
    /// Probability that an attendee skips one occurrence
    #[arg(long, default_value_t = 0.1)]
    drop_out: f64,
    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Output CSV file path
    #[arg(long)]
    output: Option<PathBuf>,
}

/// A meeting held every week on the same day, time and space.
#[derive(Debug, Clone)]
struct Meeting {
    space: SpaceId,
    weekday: Weekday,
    start: u32,
    end: u32,
    attendees: Vec<ClientId>,
}

impl Meeting {
    fn random<R>(space: SpaceId, clients: &[ClientId], rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let start = rng.random_range(EARLIEST_START / START_GRID..LATEST_START / START_GRID)
            * START_GRID;
        let end = start + rng.random_range(MIN_DURATION..=MAX_DURATION);
        let size = rng.random_range(MIN_ATTENDEES..=MAX_ATTENDEES);
        Self {
            space,
            weekday: *WORKDAYS.choose(rng).unwrap_or(&Weekday::Mon),
            start,
            end,
            attendees: clients.choose_multiple(rng, size).cloned().collect(),
        }
    }

    /// Sightings of every attendee on `date`, if the meeting takes place then.
    fn observe<R>(
        &self,
        date: NaiveDate,
        jitter: &Normal<f64>,
        drop_out: f64,
        rng: &mut R,
        out: &mut Vec<(SpaceId, Observation)>,
    ) where
        R: Rng + ?Sized,
    {
        if date.weekday() != self.weekday {
            return;
        }
        let midnight = date.and_time(NaiveTime::MIN);
        for client in &self.attendees {
            if rng.random_bool(drop_out) {
                continue;
            }
            let arrival = jittered(self.start, jitter, rng);
            let departure = jittered(self.end, jitter, rng).max(arrival);
            let mut minute = arrival;
            while minute <= departure {
                let time = midnight + TimeDelta::minutes(minute);
                if time.date() == date {
                    out.push((
                        self.space.clone(),
                        Observation::new(time, client.clone()),
                    ));
                }
                minute += SIGHTING_INTERVAL;
            }
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
fn jittered<R>(minute: u32, jitter: &Normal<f64>, rng: &mut R) -> i64
where
    R: Rng + ?Sized,
{
    (f64::from(minute) + jitter.sample(rng)).round() as i64
}

/// Observations of `days` days of weekly meetings starting at `start`,
/// ordered by time.
fn generate<R>(
    arg: &GenerateObservationsArg,
    rng: &mut R,
) -> anyhow::Result<Vec<(SpaceId, Observation)>>
where
    R: Rng + ?Sized,
{
    anyhow::ensure!(
        (0.0..=1.0).contains(&arg.drop_out),
        "drop-out probability must be within [0, 1], got {}",
        arg.drop_out
    );
    anyhow::ensure!(arg.spaces > 0, "at least one space is required");
    let jitter = Normal::new(0.0, arg.jitter)?;

    let clients = (1..=arg.clients)
        .map(|i| ClientId::from(format!("client-{i:03}").as_str()))
        .collect::<Vec<_>>();
    let meetings = (0..arg.meetings)
        .map(|i| {
            let space = SpaceId::from(format!("space-{}", i % arg.spaces + 1).as_str());
            Meeting::random(space, &clients, rng)
        })
        .collect::<Vec<_>>();

    let mut observations = vec![];
    for date in arg.start.iter_days().take(arg.days as usize) {
        for meeting in &meetings {
            meeting.observe(date, &jitter, arg.drop_out, rng, &mut observations);
        }
    }
    observations.sort_by(|(space_a, a), (space_b, b)| {
        (a.time, space_a, &a.client).cmp(&(b.time, space_b, &b.client))
    });
    Ok(observations)
}

pub(crate) fn run(arg: &GenerateObservationsArg) -> anyhow::Result<()> {
    let mut rng = match arg.seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let observations = generate(arg, &mut rng)?;

    let mut output = Output::from_output_path(arg.output.clone())?;
    output.write_line(util::OBSERVATIONS_HEADER)?;
    for (space, observation) in &observations {
        let line = format!(
            "{space},{},{}",
            observation.time.format(util::TIME_FORMAT),
            observation.client
        );
        output.write_line(&line)?;
    }
    output.finish()?;

    eprintln!(
        "Generated {} observations over {} days",
        observations.len(),
        arg.days
    );
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use scenlearn_learner::{
        Learner, LearnerConfig, config::SmoothingKind, observation::ObservationTable,
    };

    use super::*;

    fn arg() -> GenerateObservationsArg {
        GenerateObservationsArg {
            start: NaiveDate::from_ymd_opt(2017, 11, 27).unwrap(),
            days: 21,
            meetings: 1,
            clients: 8,
            spaces: 1,
            jitter: 1.0,
            drop_out: 0.0,
            seed: None,
            output: None,
        }
    }

    #[test]
    fn test_same_seed_same_observations() {
        let a = generate(&arg(), &mut Pcg32::seed_from_u64(3)).unwrap();
        let b = generate(&arg(), &mut Pcg32::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_meetings_recur_weekly() {
        let observations = generate(&arg(), &mut Pcg32::seed_from_u64(11)).unwrap();
        assert!(!observations.is_empty());
        assert!(observations.is_sorted_by_key(|(_, o)| o.time));

        let weekday = observations[0].1.time.weekday();
        assert!(observations.iter().all(|(_, o)| o.time.weekday() == weekday));
        let mut dates = observations
            .iter()
            .map(|(_, o)| o.time.date())
            .collect::<Vec<_>>();
        dates.dedup();
        assert_eq!(dates.len(), 3);
    }

    #[test]
    fn test_invalid_drop_out_is_rejected() {
        let arg = GenerateObservationsArg {
            drop_out: 1.5,
            ..arg()
        };
        assert!(generate(&arg, &mut Pcg32::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_learner_recovers_the_meeting() {
        let arg = GenerateObservationsArg {
            jitter: 0.0,
            ..arg()
        };
        let observations = generate(&arg, &mut Pcg32::seed_from_u64(5)).unwrap();
        let table = observations.into_iter().collect::<ObservationTable>();

        let end = arg.start + TimeDelta::days(i64::from(arg.days) - 1);
        let mut config = LearnerConfig::new(arg.start, end);
        config.segmentation.smooth = SmoothingKind::None;
        config.segmentation.occ_thresh = 2.0;
        let model = Learner::new(config).unwrap().learn(&table).unwrap();

        assert_eq!(model.meta_events.len(), 1);
        assert_eq!(model.meta_events[0].events().len(), 3);
        assert_eq!(model.meta_people.len(), 1);
        assert!(model.people.len() >= MIN_ATTENDEES);
    }
}
