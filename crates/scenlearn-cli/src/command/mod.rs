use clap::{Parser, Subcommand};

use self::{
    generate_observations::GenerateObservationsArg, learn::LearnArg, segment::SegmentArg,
};

mod generate_observations;
mod learn;
mod segment;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Learn events, meta-events, people and meta-people from observations
    Learn(#[clap(flatten)] LearnArg),
    /// Segment one day at one space and print the occupancy series
    Segment(#[clap(flatten)] SegmentArg),
    /// Generate synthetic observations of weekly meetings
    GenerateObservations(#[clap(flatten)] GenerateObservationsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Learn(arg) => learn::run(&arg)?,
        Mode::Segment(arg) => segment::run(&arg)?,
        Mode::GenerateObservations(arg) => generate_observations::run(&arg)?,
    }
    Ok(())
}
