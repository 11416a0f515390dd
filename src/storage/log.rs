use std::fs::{self, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

use super::csv::parse_records;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A record that can be appended to an [`AppendLog`] as one CSV row.
pub trait LogRecord {
    /// Column names written as the first line of a new log
    const HEADER: &'static str;

    /// Render the record as a CSV row without the line terminator.
    fn to_row(&self) -> String;
}

/// An append-only CSV file of `R` records.
///
/// The file is opened, appended to, and closed for every write so a crash never
/// leaves a buffered row behind. Writes from concurrent sessions are serialized
/// so rows never interleave.
#[derive(Debug)]
pub struct AppendLog<R> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<fn(&R)>,
}

impl<R: LogRecord> AppendLog<R> {
    /// Open the log at `path`, creating it with its header line if it is
    /// missing or empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or the file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("create directory for", &path, e))?;
        }

        let needs_header = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(StorageError::io("inspect", &path, e)),
        };

        if needs_header {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| StorageError::io("create", &path, e))?;
            writeln!(file, "{}", R::HEADER).map_err(|e| StorageError::io("write header to", &path, e))?;
            debug!("Created log {} with header", path.display());
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    pub fn append(&self, record: &R) -> Result<(), StorageError> {
        self.append_all(std::slice::from_ref(record))
    }

    /// Append several records in order with a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written.
    pub fn append_all(&self, records: &[R]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for record in records {
            buf.push_str(&record.to_row());
            buf.push('\n');
        }

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io("open", &self.path, e))?;
        file.write_all(buf.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| StorageError::io("append to", &self.path, e))
    }

    /// Read every data row, skipping the header line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_rows(&self) -> Result<Vec<Vec<String>>, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let text = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::io("read", &self.path, e))?;
        Ok(parse_records(&text).into_iter().skip(1).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Note(&'static str, u32);

    impl LogRecord for Note {
        const HEADER: &'static str = "text,count";

        fn to_row(&self) -> String {
            format!("{},{}", super::super::csv::quoted(self.0), self.1)
        }
    }

    #[test]
    fn test_open_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("notes.csv");

        let log: AppendLog<Note> = AppendLog::open(&path).unwrap();
        log.append(&Note("first", 1)).unwrap();
        drop(log);

        let log: AppendLog<Note> = AppendLog::open(&path).unwrap();
        log.append(&Note("second", 2)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "text,count\n\"first\",1\n\"second\",2\n");
    }

    #[test]
    fn test_read_rows_skips_header() {
        let dir = tempdir().unwrap();
        let log: AppendLog<Note> = AppendLog::open(dir.path().join("notes.csv")).unwrap();
        log.append_all(&[Note("a, b", 1), Note("line\nbreak", 2)]).unwrap();

        let rows = log.read_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["a, b", "1"]);
        assert_eq!(rows[1], vec!["line\nbreak", "2"]);
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = tempdir().unwrap();
        let log: std::sync::Arc<AppendLog<Note>> =
            std::sync::Arc::new(AppendLog::open(dir.path().join("notes.csv")).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        log.append(&Note("concurrent", i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let rows = log.read_rows().unwrap();
        assert_eq!(rows.len(), 200);
        assert!(rows.iter().all(|r| r.len() == 2 && r[0] == "concurrent"));
    }
}
