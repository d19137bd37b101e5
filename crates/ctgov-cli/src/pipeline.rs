//! Batch conversion of an index of study documents into NDJSON.
//!
//! The run is a single sequential pass:
//! 1. Create the output directory and truncate the output file
//! 2. Stream document paths from the index file
//! 3. Parse and extract each document, writing one line per success
//! 4. Report progress every [`PROGRESS_INTERVAL`] records and a final summary
//!
//! A document that fails to read or parse is logged and counted, then
//! skipped. Only index and output I/O failures end the run early.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use ctgov_ingest::{IndexPaths, parse_trial};
use ctgov_model::TrialRecord;

use crate::diagnostics::DiagnosticSink;

/// Number of written records between progress messages.
pub const PROGRESS_INTERVAL: usize = 1000;

/// Inputs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// File listing one document path per line.
    pub index_file: PathBuf,
    /// NDJSON destination, truncated at the start of the run.
    pub output: PathBuf,
    /// Stop once this many records have been written.
    pub max_records: Option<usize>,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub records: usize,
    pub failures: usize,
    pub output: PathBuf,
    /// True when `max_records` ended the run before the index was exhausted.
    pub reached_limit: bool,
}

/// Convert every document listed in the index, reading files from disk.
pub fn process_trials(config: &BatchConfig, sink: &dyn DiagnosticSink) -> Result<BatchSummary> {
    process_trials_with(config, sink, parse_trial)
}

/// Run the batch with a custom document parser.
///
/// `parse` is called once per attempted path, in index order.
pub fn process_trials_with<F>(
    config: &BatchConfig,
    sink: &dyn DiagnosticSink,
    mut parse: F,
) -> Result<BatchSummary>
where
    F: FnMut(&Path) -> ctgov_ingest::Result<TrialRecord>,
{
    let mut writer = create_output(&config.output)?;
    let paths = IndexPaths::open(&config.index_file)?;
    sink.debug(&format!(
        "Reading document paths from {}",
        config.index_file.display()
    ));

    let mut records = 0usize;
    let mut failures = 0usize;
    let mut reached_limit = false;

    for path in paths {
        let path = path?;
        if config.max_records.is_some_and(|max| records >= max) {
            reached_limit = true;
            break;
        }
        let line = match parse(&path) {
            Ok(record) => serde_json::to_string(&record)
                .with_context(|| format!("serialize record for {}", path.display())),
            Err(error) => Err(error.into()),
        };
        match line {
            Ok(line) => {
                writer
                    .write_all(line.as_bytes())
                    .and_then(|()| writer.write_all(b"\n"))
                    .with_context(|| format!("write {}", config.output.display()))?;
                records += 1;
                if records % PROGRESS_INTERVAL == 0 {
                    sink.info(&format!("Parsed {records} trial records"));
                }
            }
            Err(error) => {
                failures += 1;
                sink.error(&format!("Skipping document: {error}"));
            }
        }
    }

    writer
        .flush()
        .with_context(|| format!("flush {}", config.output.display()))?;
    sink.info(&format!(
        "Done. Records: {records}, Failures: {failures}, Output: {}",
        config.output.display()
    ));

    Ok(BatchSummary {
        records,
        failures,
        output: config.output.clone(),
        reached_limit,
    })
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("create output file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tracing::Level;

    #[derive(Default)]
    struct Recorder {
        messages: RefCell<Vec<(Level, String)>>,
    }

    impl DiagnosticSink for Recorder {
        fn log(&self, level: Level, message: &str) {
            self.messages.borrow_mut().push((level, message.to_string()));
        }
    }

    fn record(nct_id: &str) -> TrialRecord {
        TrialRecord {
            nct_id: nct_id.to_string(),
            ..TrialRecord::default()
        }
    }

    #[test]
    fn test_progress_every_interval() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index");
        let lines: Vec<String> = (0..2500).map(|i| format!("NCT{i:05}.xml")).collect();
        fs::write(&index, lines.join("\n")).unwrap();
        let config = BatchConfig {
            index_file: index,
            output: dir.path().join("out.ndjson"),
            max_records: None,
        };
        let sink = Recorder::default();

        let summary = process_trials_with(&config, &sink, |path| {
            Ok(record(&path.display().to_string()))
        })
        .unwrap();

        assert_eq!(summary.records, 2500);
        let progress: Vec<String> = sink
            .messages
            .borrow()
            .iter()
            .filter(|(_, message)| message.starts_with("Parsed "))
            .map(|(_, message)| message.clone())
            .collect();
        assert_eq!(
            progress,
            vec!["Parsed 1000 trial records", "Parsed 2000 trial records"]
        );
    }

    #[test]
    fn test_zero_limit_attempts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index");
        fs::write(&index, "a.xml\nb.xml\n").unwrap();
        let config = BatchConfig {
            index_file: index,
            output: dir.path().join("out.ndjson"),
            max_records: Some(0),
        };
        let mut attempts = 0;

        let summary = process_trials_with(&config, &Recorder::default(), |_| {
            attempts += 1;
            Ok(record("NCT0"))
        })
        .unwrap();

        assert_eq!(attempts, 0);
        assert_eq!(summary.records, 0);
        assert!(summary.reached_limit);
        assert_eq!(fs::read_to_string(&config.output).unwrap(), "");
    }

    #[test]
    fn test_limit_counts_successes_only() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index");
        fs::write(&index, "bad.xml\nNCT1.xml\nNCT2.xml\nNCT3.xml\n").unwrap();
        let config = BatchConfig {
            index_file: index,
            output: dir.path().join("out.ndjson"),
            max_records: Some(2),
        };
        let mut attempted = Vec::new();

        let summary = process_trials_with(&config, &Recorder::default(), |path| {
            attempted.push(path.to_path_buf());
            if path == Path::new("bad.xml") {
                Err(ctgov_ingest::IngestError::FileRead {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
                })
            } else {
                Ok(record(&path.display().to_string()))
            }
        })
        .unwrap();

        assert_eq!(attempted.len(), 3);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.failures, 1);
        assert!(summary.reached_limit);
    }

    #[test]
    fn test_limit_not_reached_when_index_ends() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index");
        fs::write(&index, "NCT1.xml\n").unwrap();
        let config = BatchConfig {
            index_file: index,
            output: dir.path().join("out.ndjson"),
            max_records: Some(1),
        };

        let summary =
            process_trials_with(&config, &Recorder::default(), |_| Ok(record("NCT1"))).unwrap();

        assert_eq!(summary.records, 1);
        assert!(!summary.reached_limit);
    }
}
