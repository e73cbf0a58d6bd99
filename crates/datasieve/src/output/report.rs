//! JSON scan report.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SieveError};

/// Write any serializable report as pretty JSON, creating the parent
/// directory if needed.
pub fn write_report<T: Serialize>(report: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| SieveError::io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| SieveError::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    Ok(())
}

/// Read a report previously written by [`write_report`].
pub fn read_report<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SieveError::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
