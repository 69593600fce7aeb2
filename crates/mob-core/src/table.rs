//! Core table types for representing mob_proto data

use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Column holding the mob identifier (VNUM)
pub const ID_COLUMN: usize = 0;
/// Column holding the mob display name
pub const NAME_COLUMN: usize = 1;
/// Header the name column must carry for name substitution to apply
pub const NAME_HEADER: &str = "NAME";

/// A loaded mob_proto table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column definitions, in file order
    pub columns: Vec<Column>,
    /// Row data, in file order
    pub rows: Vec<Row>,
    /// Source file path
    pub source_path: PathBuf,
    /// Encoding the source file was decoded with
    pub encoding: TextEncoding,
}

impl Table {
    /// Create a new empty table
    pub fn new(source_path: PathBuf, encoding: TextEncoding) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            source_path,
            encoding,
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Header names in column order
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Find the first column with exactly this name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether the second column is the `NAME` column
    pub fn has_name_column(&self) -> bool {
        self.columns
            .get(NAME_COLUMN)
            .is_some_and(|c| c.name == NAME_HEADER)
    }

    /// Get a cell by row and column index
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Overwrite a cell in place
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let cell = self
            .rows
            .get_mut(row)
            .and_then(|r| r.cells.get_mut(col))
            .ok_or(Error::CellOutOfRange { row, col })?;
        *cell = value.into();
        Ok(())
    }
}

/// A column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (e.g., "VNUM" or "EXP")
    pub name: String,
    /// Column index (0-based)
    pub index: usize,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, index: usize) -> Self {
        Self { name, index }
    }
}

/// A row of raw field values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Field values, at least one per column
    pub cells: Vec<String>,
}

impl Row {
    /// Create a new row
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// The identifier field, empty if the row has no fields
    pub fn id(&self) -> &str {
        self.get(ID_COLUMN).unwrap_or("")
    }

    /// Get a field by column index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no fields
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Typed view of a cell, used when a cell takes part in arithmetic
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Empty/null cell
    Empty,
}

impl CellValue {
    /// Parse a string into a CellValue, detecting the type
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }

        CellValue::String(trimmed.to_string())
    }

    /// Numeric value of the cell, `None` for text and blanks
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            CellValue::String(_) | CellValue::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(PathBuf::from("mob_proto.txt"), TextEncoding::Utf8);
        table.columns = ["VNUM", "NAME", "EXP"]
            .iter()
            .enumerate()
            .map(|(i, n)| Column::new(n.to_string(), i))
            .collect();
        table.rows.push(Row::new(vec![
            "101".to_string(),
            "Wolf".to_string(),
            "100".to_string(),
        ]));
        table
    }

    #[test]
    fn test_cell_value_parse_integer() {
        assert_eq!(CellValue::parse("42"), CellValue::Integer(42));
        assert_eq!(CellValue::parse("-123"), CellValue::Integer(-123));
        assert_eq!(CellValue::parse(" 7 "), CellValue::Integer(7));
    }

    #[test]
    fn test_cell_value_parse_float() {
        assert_eq!(CellValue::parse("2.5"), CellValue::Float(2.5));
        assert_eq!(CellValue::parse("-0.5"), CellValue::Float(-0.5));
    }

    #[test]
    fn test_cell_value_parse_string_and_empty() {
        assert_eq!(
            CellValue::parse("MONSTER"),
            CellValue::String("MONSTER".to_string())
        );
        assert_eq!(CellValue::parse("   "), CellValue::Empty);
    }

    #[test]
    fn test_cell_value_as_number() {
        assert_eq!(CellValue::Integer(3).as_number(), Some(3.0));
        assert_eq!(CellValue::Float(1.5).as_number(), Some(1.5));
        assert_eq!(CellValue::String("x".into()).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn test_find_column_and_name_header() {
        let table = sample();
        assert_eq!(table.find_column("EXP").map(|c| c.index), Some(2));
        assert!(table.find_column("GOLD_MIN").is_none());
        assert!(table.has_name_column());
        assert_eq!(table.rows[0].id(), "101");
    }

    #[test]
    fn test_set_cell_out_of_range() {
        let mut table = sample();
        table.set_cell(0, 2, "400").unwrap();
        assert_eq!(table.cell(0, 2), Some("400"));
        assert!(matches!(
            table.set_cell(3, 0, "x"),
            Err(Error::CellOutOfRange { row: 3, col: 0 })
        ));
    }
}
