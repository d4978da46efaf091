use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use scenlearn_learner::{
    observation::ObservationSource as _,
    segmentation::{self, DaySegmentation},
};
use scenlearn_model::{id::SpaceId, time_profile::clock_string};

use crate::{
    run_config::{OverrideArg, RunConfig},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SegmentArg {
    /// Run configuration file (JSON)
    config: PathBuf,
    /// Day to segment (YYYY-MM-DD)
    #[arg(long)]
    date: NaiveDate,
    /// Space to segment
    #[arg(long)]
    space: String,
    /// Output CSV file path
    #[arg(long)]
    output: Option<PathBuf>,
    #[clap(flatten)]
    overrides: OverrideArg,
}

/// CSV lines of `time,count,smoothed,breakpoint`, one per bucket.
///
/// `breakpoint` is 1 on the first bucket of every segment after the first.
fn series_lines(day: &DaySegmentation) -> impl Iterator<Item = String> + '_ {
    let series = &day.series;
    (0..series.len()).map(move |bucket| {
        let breakpoint = u8::from(bucket > 0 && day.breakpoints.contains(&bucket));
        format!(
            "{},{},{},{breakpoint}",
            clock_string(f64::from(series.bucket_start(bucket))),
            series.counts()[bucket],
            series.smoothed()[bucket],
        )
    })
}

pub(crate) fn run(arg: &SegmentArg) -> anyhow::Result<()> {
    let SegmentArg {
        config,
        date,
        space,
        output,
        overrides,
    } = arg;
    let RunConfig {
        learners: config,
        filepaths,
    } = RunConfig::load(config, overrides)?;
    config
        .segmentation
        .validate()
        .context("Invalid segmentation configuration")?;

    let table = util::read_observations_file(&filepaths.data)?;
    let space = SpaceId::from(space.as_str());
    let observations = table
        .observations_on(*date)?
        .remove(&space)
        .unwrap_or_default();
    eprintln!("{} observations at {space} on {date}", observations.len());

    let day = segmentation::segment_day(*date, &space, &observations, &config.segmentation)
        .with_context(|| format!("Failed to segment {space} on {date}"))?;

    let mut output = Output::from_output_path(output.clone())?;
    output.write_line("time,count,smoothed,breakpoint")?;
    for line in series_lines(&day) {
        output.write_line(&line)?;
    }
    output.finish()?;

    eprintln!("Segments:");
    for segment in &day.segments {
        let marker = if segment.is_event(config.segmentation.occ_thresh) {
            "event"
        } else {
            "-"
        };
        eprintln!(
            "  {}-{}  mean {:6.2}  std {:6.2}  {marker}",
            clock_string(f64::from(segment.start_minute)),
            clock_string(f64::from(segment.end_minute)),
            segment.occupancy.mean,
            segment.occupancy.std_dev,
        );
    }
    for event in &day.events {
        eprintln!(
            "Event {}-{}: {} attendees",
            clock_string(f64::from(event.segment.start_minute)),
            clock_string(f64::from(event.segment.end_minute)),
            event.attendees.len(),
        );
    }

    Ok(())
}
