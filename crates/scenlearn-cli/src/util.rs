use std::{
    fs::File,
    io::{self, BufRead as _, BufReader, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context, bail};
use chrono::NaiveDateTime;
use scenlearn_learner::observation::{Observation, ObservationTable};
use scenlearn_model::id::{ClientId, SpaceId};

/// Timestamp format of the observation CSV.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header line of the observation CSV.
pub const OBSERVATIONS_HEADER: &str = "SpaceID,time,user";

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }

    /// Writes one line of text, without flushing.
    pub fn write_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(&mut *self, "{line}")
            .with_context(|| format!("Failed to write to {}", self.display_path()))
    }

    pub fn finish(&mut self) -> anyhow::Result<()> {
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a list of space ids, one per line
///
/// Blank lines are skipped and surrounding whitespace is trimmed.
pub fn read_spaces_file<P>(path: P) -> anyhow::Result<Vec<SpaceId>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open spaces file: {}", path.display()))?;

    let mut spaces = vec![];
    for line in BufReader::new(file).lines() {
        let line =
            line.with_context(|| format!("Failed to read spaces file: {}", path.display()))?;
        let line = line.trim();
        if !line.is_empty() {
            spaces.push(SpaceId::from(line));
        }
    }
    Ok(spaces)
}

/// Parse one data line of the observation CSV
///
/// # Errors
///
/// Returns error if the line does not have exactly three fields or the
/// timestamp is not in [`TIME_FORMAT`].
pub fn parse_observation_line(line: &str) -> anyhow::Result<(SpaceId, Observation)> {
    let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
    let &[space, time, client] = fields.as_slice() else {
        bail!("expected 3 fields, got {}", fields.len());
    };
    let time = NaiveDateTime::parse_from_str(time, TIME_FORMAT)
        .with_context(|| format!("Malformed timestamp: {time:?}"))?;
    Ok((
        SpaceId::from(space),
        Observation::new(time, ClientId::from(client)),
    ))
}

/// Read observations from a CSV file with header `SpaceID,time,user`
///
/// # Errors
///
/// Returns error if the file cannot be read, the header is missing, or any
/// line is malformed. The error names the file and the line number.
pub fn read_observations_file<P>(path: P) -> anyhow::Result<ObservationTable>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open observations file: {}", path.display()))?;

    let mut lines = BufReader::new(file).lines();
    let header = lines
        .next()
        .transpose()
        .with_context(|| format!("Failed to read observations file: {}", path.display()))?;
    if header.as_deref().map(str::trim) != Some(OBSERVATIONS_HEADER) {
        bail!(
            "Missing header {OBSERVATIONS_HEADER:?} in observations file: {}",
            path.display()
        );
    }

    let mut table = ObservationTable::new();
    for (index, line) in lines.enumerate() {
        let line_number = index + 2;
        let line =
            line.with_context(|| format!("Failed to read {}:{line_number}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let (space, observation) = parse_observation_line(&line)
            .with_context(|| format!("Invalid observation at {}:{line_number}", path.display()))?;
        table.insert(space, observation);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("scenlearn-{}-{name}", std::process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_observation_line() {
        let (space, observation) =
            parse_observation_line("ap-1, 2017-11-28 09:00:05 ,alice").unwrap();
        assert_eq!(space, SpaceId::from("ap-1"));
        assert_eq!(observation.client, ClientId::from("alice"));
        assert_eq!(
            observation.time,
            NaiveDate::from_ymd_opt(2017, 11, 28)
                .unwrap()
                .and_hms_opt(9, 0, 5)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert!(parse_observation_line("ap-1,2017-11-28 09:00:05").is_err());
        assert!(parse_observation_line("ap-1,28/11/2017 09:00,alice").is_err());
    }

    #[test]
    fn test_read_observations_names_the_line() {
        let path = temp_file(
            "bad.csv",
            "SpaceID,time,user\nap,2017-11-28 09:00:00,a\nap,yesterday,b\n",
        );
        let err = read_observations_file(&path).unwrap_err();
        assert!(format!("{err}").ends_with(":3"), "{err}");
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_observations() {
        let path = temp_file(
            "good.csv",
            "SpaceID,time,user\nap,2017-11-28 09:00:00,a\n\nhall,2017-11-29 10:00:00,b\n",
        );
        let table = read_observations_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.spaces(), vec![SpaceId::from("ap"), SpaceId::from("hall")]);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_read_spaces_file() {
        let path = temp_file("spaces.txt", "ap-1\n\n  ap-2 \n");
        assert_eq!(
            read_spaces_file(&path).unwrap(),
            vec![SpaceId::from("ap-1"), SpaceId::from("ap-2")]
        );
        fs::remove_file(path).unwrap();
    }
}
