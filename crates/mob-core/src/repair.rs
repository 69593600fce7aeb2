//! Rewriting a mis-encoded mob_names.txt as clean UTF-8

use crate::encoding::{read_decoded, TextEncoding, NAMES_ENCODINGS};
use crate::error::{Error, Result};
use crate::names::{fix_line, load_names, NameLookup};
use crate::writer::create_backup;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of repairing the names file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// File that was repaired
    pub path: PathBuf,
    /// Copy of the file before repair
    pub backup: PathBuf,
    /// Encoding the file was read with
    pub encoding: TextEncoding,
    /// Number of lines the repair table changed
    pub lines_changed: usize,
    /// Entries in the rebuilt lookup
    pub names_loaded: usize,
}

/// Apply the full repair table to every line
///
/// Line endings are normalized to `\n`. Returns the repaired text and the
/// number of lines that changed.
pub fn repair_names_text(text: &str) -> (String, usize) {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut repaired = String::with_capacity(normalized.len());
    let mut lines_changed = 0;
    for line in normalized.split_inclusive('\n') {
        let fixed = fix_line(line);
        if fixed != line {
            lines_changed += 1;
        }
        repaired.push_str(&fixed);
    }
    (repaired, lines_changed)
}

/// Back up, repair and rewrite the names file, then reload it
///
/// The returned lookup replaces whatever lookup the caller held.
pub fn repair_names_file<P: AsRef<Path>>(path: P) -> Result<(RepairReport, NameLookup)> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::NamesFileMissing(path.to_path_buf()));
    }

    let backup = create_backup(path)?.ok_or_else(|| Error::NamesFileMissing(path.to_path_buf()))?;

    let decoded = read_decoded(path, NAMES_ENCODINGS)?;
    let (repaired, lines_changed) = repair_names_text(&decoded.text);
    fs::write(path, repaired.as_bytes()).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    let lookup = load_names(path)?.parse.lookup;

    info!(
        path = %path.display(),
        encoding = %decoded.encoding,
        lines_changed,
        names = lookup.len(),
        "repaired names file"
    );

    let report = RepairReport {
        path: path.to_path_buf(),
        backup,
        encoding: decoded.encoding,
        lines_changed,
        names_loaded: lookup.len(),
    };
    Ok((report, lookup))
}
