//! Saving tables back to disk with timestamped backups

use crate::error::{Error, Result};
use crate::table::Table;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Timestamp format appended to backup file names
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `<path>.backup_<YYYYMMDD_HHMMSS>`
pub fn backup_path_for(path: &Path, timestamp: NaiveDateTime) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".backup_{}", timestamp.format(BACKUP_TIMESTAMP_FORMAT)));
    PathBuf::from(name)
}

/// Copy `path` to a timestamped backup beside it
///
/// Returns `None` when there is nothing to back up.
pub fn create_backup(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let backup = backup_path_for(path, Local::now().naive_local());
    fs::copy(path, &backup).map_err(|e| Error::Backup {
        path: path.to_path_buf(),
        backup: backup.clone(),
        source: e,
    })?;

    info!(path = %path.display(), backup = %backup.display(), "created backup");
    Ok(Some(backup))
}

/// Write the header and rows as UTF-8, tab-separated, one line each
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let write_err = |e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", table.header().join("\t")).map_err(write_err)?;
    for row in &table.rows {
        writeln!(writer, "{}", row.cells.join("\t")).map_err(write_err)?;
    }
    writer.flush().map_err(write_err)?;
    Ok(())
}

/// Result of a save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    /// File that was written
    pub path: PathBuf,
    /// Backup of the previous contents, if the file existed
    pub backup: Option<PathBuf>,
    /// Number of data rows written
    pub rows_written: usize,
}

/// Back up the existing file, then write the table over it
///
/// If the backup cannot be made the target is not touched.
pub fn save_table<P: AsRef<Path>>(table: &Table, path: P) -> Result<SaveReport> {
    let path = path.as_ref();
    let backup = create_backup(path)?;
    write_table(table, path)?;

    info!(path = %path.display(), rows = table.row_count(), "saved mob_proto");
    Ok(SaveReport {
        path: path.to_path_buf(),
        backup,
        rows_written: table.row_count(),
    })
}
