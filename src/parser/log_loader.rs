//! Sequential line reader for training-log files.
//!
//! Lines are decoded lossily so that stray non-UTF-8 bytes in a log never
//! abort a run; only real I/O failures do.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::PlotError;

/// Buffer size for reading log files (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Fail with `FileNotFound` unless `path` is an existing regular file.
pub fn ensure_log_file(path: &Path) -> Result<(), PlotError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PlotError::FileNotFound(path.to_path_buf()))
    }
}

/// Log file reader. The file is closed when the loader is dropped.
pub struct LogLoader {
    path: PathBuf,
    reader: BufReader<File>,
    raw_buffer: Vec<u8>,
    line_buffer: String,
    line_number: usize,
}

impl LogLoader {
    /// Open a log file for reading from the start.
    pub fn open(path: &Path) -> Result<Self, PlotError> {
        ensure_log_file(path)?;
        let file = File::open(path).map_err(|source| PlotError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::with_capacity(BUFFER_SIZE, file),
            raw_buffer: Vec::with_capacity(512),
            line_buffer: String::with_capacity(512),
            line_number: 0,
        })
    }

    /// Read the next line, without its line terminator.
    ///
    /// Returns `Ok(None)` at end of file.
    pub fn next_line(&mut self) -> Result<Option<&str>, PlotError> {
        self.raw_buffer.clear();
        let read = self.reader.read_until(b'\n', &mut self.raw_buffer).map_err(|source| PlotError::Read {
            path: self.path.clone(),
            source,
        })?;
        if read == 0 {
            return Ok(None);
        }

        self.line_number += 1;
        self.line_buffer.clear();
        self.line_buffer.push_str(&String::from_utf8_lossy(&self.raw_buffer));
        Ok(Some(self.line_buffer.trim_end_matches(['\n', '\r'])))
    }

    /// 1-based number of the line most recently returned by `next_line`.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}
