//! Lazy reader for index files listing one study path per line.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Iterator over the document paths in an index file.
///
/// Lines are trimmed and blank lines are skipped. The file is read one line
/// at a time and closed when the iterator is dropped.
pub struct IndexPaths<R> {
    source: PathBuf,
    lines: Lines<R>,
}

impl IndexPaths<BufReader<File>> {
    /// Open `path` for streaming.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| IngestError::IndexOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(path, BufReader::new(file)))
    }
}

impl<R: BufRead> IndexPaths<R> {
    /// Stream paths from any buffered reader; `source` names it in errors.
    pub fn from_reader(source: impl Into<PathBuf>, reader: R) -> Self {
        Self {
            source: source.into(),
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for IndexPaths<R> {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.lines.next()? {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(Ok(PathBuf::from(trimmed)));
                }
                Err(source) => {
                    return Some(Err(IngestError::IndexRead {
                        path: self.source.clone(),
                        source,
                    }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(input: &str) -> Vec<PathBuf> {
        IndexPaths::from_reader("index", Cursor::new(input.to_string()))
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_skips_blank_lines_and_trims() {
        let paths = collect("a/NCT001.xml\n\n   \n  b/NCT002.xml  \r\nc/NCT003.xml");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a/NCT001.xml"),
                PathBuf::from("b/NCT002.xml"),
                PathBuf::from("c/NCT003.xml"),
            ]
        );
    }

    #[test]
    fn test_empty_index() {
        assert!(collect("").is_empty());
        assert!(collect("\n\n").is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let bytes: &[u8] = b"ok.xml\n\xff\xfe\n";
        let mut paths = IndexPaths::from_reader("index", bytes);
        assert!(matches!(paths.next(), Some(Ok(_))));
        assert!(matches!(
            paths.next(),
            Some(Err(IngestError::IndexRead { .. }))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = IndexPaths::open(&dir.path().join("missing"));
        assert!(matches!(result, Err(IngestError::IndexOpen { .. })));
    }
}
