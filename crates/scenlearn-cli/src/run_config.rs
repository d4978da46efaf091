use std::path::{Path, PathBuf};

use scenlearn_learner::{
    LearnerConfig,
    config::{PersonGrouping, SmoothingKind},
};
use scenlearn_model::id::SpaceId;
use serde::Deserialize;

use crate::util;

/// Contents of the run configuration file.
///
/// Relative paths are resolved against the working directory.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RunConfig {
    pub(crate) learners: LearnerConfig,
    #[serde(default)]
    pub(crate) filepaths: FilePaths,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct FilePaths {
    /// Observation CSV
    pub(crate) data: PathBuf,
    /// Space ids to process, one per line
    pub(crate) spaces: Option<PathBuf>,
    pub(crate) events: PathBuf,
    pub(crate) people: PathBuf,
    pub(crate) metaevents: PathBuf,
    pub(crate) metapeople: PathBuf,
}

impl Default for FilePaths {
    fn default() -> Self {
        Self {
            data: PathBuf::from("observations.csv"),
            spaces: None,
            events: PathBuf::from("events.json"),
            people: PathBuf::from("people.json"),
            metaevents: PathBuf::from("metaevents.json"),
            metapeople: PathBuf::from("metapeople.json"),
        }
    }
}

impl FilePaths {
    /// Moves every output file into `dir`, keeping its file name.
    pub(crate) fn relocate_outputs(&mut self, dir: &Path) {
        for path in [
            &mut self.events,
            &mut self.people,
            &mut self.metaevents,
            &mut self.metapeople,
        ] {
            let file_name = path.file_name().map(PathBuf::from).unwrap_or_default();
            *path = dir.join(file_name);
        }
    }
}

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct OverrideArg {
    /// Observation CSV file, overriding `filepaths.data`
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
    /// Smoothing applied before segmentation (none, simple, exponential)
    #[arg(long)]
    pub(crate) smooth: Option<SmoothingKind>,
    /// Person grouping method (agglomerative, greedy)
    #[arg(long)]
    pub(crate) person_grouping: Option<PersonGrouping>,
}

impl RunConfig {
    /// Reads a run configuration, applies `overrides` and merges the spaces
    /// file into the learner configuration.
    pub(crate) fn load(path: &Path, overrides: &OverrideArg) -> anyhow::Result<Self> {
        let mut config: Self = util::read_json_file("run configuration", path)?;
        config.apply(overrides);
        if let Some(spaces) = &config.filepaths.spaces {
            let spaces = util::read_spaces_file(spaces)?;
            config.merge_spaces(spaces);
        }
        Ok(config)
    }

    fn apply(&mut self, overrides: &OverrideArg) {
        let OverrideArg {
            data,
            smooth,
            person_grouping,
        } = overrides;
        if let Some(data) = data {
            self.filepaths.data.clone_from(data);
        }
        if let Some(smooth) = smooth {
            self.learners.segmentation.smooth = *smooth;
        }
        if let Some(person_grouping) = person_grouping {
            self.learners.grouping.person_grouping = *person_grouping;
        }
    }

    /// Appends the spaces that are not listed yet.
    fn merge_spaces(&mut self, extra: Vec<SpaceId>) {
        for space in extra {
            if !self.learners.spaces.contains(&space) {
                self.learners.spaces.push(space);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RunConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_file_paths_default() {
        let config = parse(r#"{ "learners": { "start": "2017-11-27", "end": "2017-12-01" } }"#);
        assert_eq!(config.filepaths, FilePaths::default());
        assert_eq!(config.learners.segmentation.unit, 5);
    }

    #[test]
    fn test_unknown_paths_are_ignored() {
        let config = parse(
            r#"{
                "learners": { "start": "2017-11-27", "end": "2017-12-01", "occ-thresh": 3 },
                "filepaths": { "data": "in.csv", "plots": "plots/", "events": "out/e.json" }
            }"#,
        );
        assert_eq!(config.filepaths.data, PathBuf::from("in.csv"));
        assert_eq!(config.filepaths.events, PathBuf::from("out/e.json"));
        assert_eq!(config.filepaths.people, PathBuf::from("people.json"));
        assert_eq!(config.learners.segmentation.occ_thresh, 3.0);
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = parse(
            r#"{
                "learners": { "start": "2017-11-27", "end": "2017-12-01", "smooth": "none" },
                "filepaths": { "data": "in.csv" }
            }"#,
        );
        config.apply(&OverrideArg {
            data: Some(PathBuf::from("other.csv")),
            smooth: Some(SmoothingKind::Simple),
            person_grouping: Some(PersonGrouping::Greedy),
        });
        assert_eq!(config.filepaths.data, PathBuf::from("other.csv"));
        assert_eq!(config.learners.segmentation.smooth, SmoothingKind::Simple);
        assert_eq!(
            config.learners.grouping.person_grouping,
            PersonGrouping::Greedy
        );
    }

    #[test]
    fn test_relocate_outputs_keeps_file_names() {
        let mut paths = FilePaths {
            events: PathBuf::from("out/e.json"),
            ..FilePaths::default()
        };
        paths.relocate_outputs(Path::new("models"));
        assert_eq!(paths.events, PathBuf::from("models/e.json"));
        assert_eq!(paths.metapeople, PathBuf::from("models/metapeople.json"));
        assert_eq!(paths.data, PathBuf::from("observations.csv"));
    }

    #[test]
    fn test_merge_spaces_skips_duplicates() {
        let mut config = parse(
            r#"{ "learners": { "start": "2017-11-27", "end": "2017-12-01", "spaces": ["a"] } }"#,
        );
        config.merge_spaces(vec![SpaceId::from("b"), SpaceId::from("a")]);
        assert_eq!(
            config.learners.spaces,
            vec![SpaceId::from("a"), SpaceId::from("b")]
        );
    }
}
