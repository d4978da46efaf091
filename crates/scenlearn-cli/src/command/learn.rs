use std::path::PathBuf;

use anyhow::Context as _;
use scenlearn_learner::Learner;

use crate::{
    run_config::{OverrideArg, RunConfig},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LearnArg {
    /// Run configuration file (JSON)
    config: PathBuf,
    /// Directory to write the learned model files to
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[clap(flatten)]
    overrides: OverrideArg,
}

pub(crate) fn run(arg: &LearnArg) -> anyhow::Result<()> {
    let LearnArg {
        config,
        output_dir,
        overrides,
    } = arg;

    let RunConfig {
        learners: config,
        mut filepaths,
    } = RunConfig::load(config, overrides)?;
    if let Some(dir) = output_dir {
        filepaths.relocate_outputs(dir);
    }

    eprintln!("Learn: {}, {}", config.start, config.end);
    if config.spaces.is_empty() {
        eprintln!("  Spaces: all observed");
    } else {
        eprintln!("  Spaces: {}", config.spaces.len());
    }

    eprintln!("Reading observations from {}...", filepaths.data.display());
    let table = util::read_observations_file(&filepaths.data)?;
    eprintln!("Read {} observations", table.len());

    let learner = Learner::new(config).context("Invalid learner configuration")?;
    let model = learner.learn(&table).context("Learning failed")?;
    let summary = model.summary();

    eprintln!();
    eprintln!("Summary:");
    eprintln!("  start       = {}", learner.config().start);
    eprintln!("  end         = {}", learner.config().end);
    eprintln!("  #MetaPeople = {}", summary.meta_people);
    eprintln!("  #MetaEvents = {}", summary.meta_events);
    eprintln!("  #People     = {}", summary.people);
    eprintln!("  #Events     = {}", summary.events);

    Output::save_json(&model.event_records(), Some(filepaths.events.clone()))?;
    Output::save_json(&model.person_records(), Some(filepaths.people.clone()))?;
    Output::save_json(
        &model.meta_person_records(),
        Some(filepaths.metapeople.clone()),
    )?;
    Output::save_json(
        &model.meta_event_records(),
        Some(filepaths.metaevents.clone()),
    )?;

    eprintln!();
    eprintln!("Model saved successfully");
    for path in [
        &filepaths.events,
        &filepaths.people,
        &filepaths.metapeople,
        &filepaths.metaevents,
    ] {
        eprintln!("  {}", path.display());
    }

    Ok(())
}
