//! Tab-delimited parser for mob_proto files

use crate::encoding::{read_decoded, TextEncoding, PROTO_ENCODINGS};
use crate::error::{Error, Result};
use crate::table::{Column, Row, Table};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Load a mob_proto file, detecting its encoding
pub fn load_proto<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let decoded = read_decoded(path, PROTO_ENCODINGS)?;
    let table = parse_proto_str(&decoded.text, path, decoded.encoding)?;

    info!(
        path = %path.display(),
        encoding = %decoded.encoding,
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded mob_proto"
    );
    Ok(table)
}

/// Parse decoded mob_proto text into a Table
///
/// Lines are trimmed and blank lines dropped before parsing, so row numbers
/// do not match raw file line numbers. Short rows are padded with empty
/// fields; rows longer than the header are kept as they are.
pub fn parse_proto_str(
    content: &str,
    source: impl Into<PathBuf>,
    encoding: TextEncoding,
) -> Result<Table> {
    let path = source.into();

    let lines: Vec<&str> = content
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(Error::EmptyFile(path));
    }

    let normalized = lines.join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(normalized.as_bytes());

    let headers = reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;

    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.to_string(), i))
        .collect();

    let mut rows = Vec::with_capacity(lines.len() - 1);
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();

        if cells.len() < columns.len() {
            cells.resize(columns.len(), String::new());
        } else if cells.len() > columns.len() {
            warn!(
                row = row_idx + 1,
                fields = cells.len(),
                columns = columns.len(),
                path = %path.display(),
                "row has more fields than the header, keeping extras"
            );
        }

        rows.push(Row::new(cells));
    }

    Ok(Table {
        columns,
        rows,
        source_path: path,
        encoding,
    })
}
