//! Bulk numeric edits across rows
//!
//! This module provides:
//! - Mass-edit specs `(column, operation, operand)` and a JSON file format for them
//! - Row selections (explicit indices or every row)
//! - The edit engine, which records an outcome for every cell it visits

use crate::error::{Error, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Arithmetic applied to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// current × operand
    Multiply,
    /// current + operand
    Add,
    /// operand, ignoring current
    Set,
}

impl Operation {
    /// All operations, in the order an edit dialog offers them
    pub const ALL: [Operation; 3] = [Operation::Multiply, Operation::Set, Operation::Add];

    /// Parse an operation name; unknown names yield `None`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "multiply" => Some(Operation::Multiply),
            "add" => Some(Operation::Add),
            "set" => Some(Operation::Set),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Multiply => "multiply",
            Operation::Add => "add",
            Operation::Set => "set",
        }
    }

    /// Apply the operation to the current value
    pub fn apply(self, current: f64, operand: f64) -> f64 {
        match self {
            Operation::Multiply => current * operand,
            Operation::Add => current + operand,
            Operation::Set => operand,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One column transform in a batch
///
/// The operation and operand are kept as text; they are interpreted per cell
/// and a bad value only skips the cells it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MassEditSpec {
    /// Column name, matched exactly against the header
    pub column: String,
    /// `multiply`, `add` or `set`
    pub operation: String,
    /// Numeric literal
    pub operand: String,
}

impl MassEditSpec {
    /// Create a new spec
    pub fn new(
        column: impl Into<String>,
        operation: impl Into<String>,
        operand: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            operation: operation.into(),
            operand: operand.into(),
        }
    }

    /// Parse `COLUMN:operation:value`
    pub fn parse_triple(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.splitn(3, ':').collect();
        match parts.as_slice() {
            [column, operation, operand] if !column.is_empty() => {
                Ok(Self::new(*column, *operation, *operand))
            }
            _ => Err(Error::InvalidEditSpec(format!(
                "'{}', expected COLUMN:operation:value",
                text
            ))),
        }
    }

    /// Check that the operation is known and the operand numeric
    ///
    /// Used when a batch is built from user input; the engine itself does not
    /// require validated specs.
    pub fn validate(&self) -> Result<()> {
        if Operation::from_name(&self.operation).is_none() {
            return Err(Error::InvalidEditSpec(format!(
                "unknown operation '{}' for column '{}'",
                self.operation, self.column
            )));
        }
        if parse_operand(&self.operand).is_none() {
            return Err(Error::InvalidEditSpec(format!(
                "operand '{}' for column '{}' is not a number",
                self.operand, self.column
            )));
        }
        Ok(())
    }
}

fn parse_operand(operand: &str) -> Option<f64> {
    operand.trim().parse::<f64>().ok()
}

/// A stored batch of mass edits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MassEditFile {
    /// Free-form note about the batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Specs, applied together
    pub edits: Vec<MassEditSpec>,
}

impl MassEditFile {
    /// Create a new empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec to the batch
    pub fn add_edit(&mut self, edit: MassEditSpec) {
        self.edits.push(edit);
    }

    /// Load a batch from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the batch to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).map_err(|e| Error::FileWrite {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }
}

/// Rows a batch applies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RowSelection {
    /// Every row in the table
    #[default]
    All,
    /// Specific row indices; duplicates collapse
    Rows(BTreeSet<usize>),
}

impl RowSelection {
    /// Select explicit rows; an empty list selects every row
    pub fn from_rows(rows: impl IntoIterator<Item = usize>) -> Self {
        let rows: BTreeSet<usize> = rows.into_iter().collect();
        if rows.is_empty() {
            RowSelection::All
        } else {
            RowSelection::Rows(rows)
        }
    }

    fn indices(&self, row_count: usize) -> Vec<usize> {
        match self {
            RowSelection::All => (0..row_count).collect(),
            RowSelection::Rows(rows) => rows.iter().copied().collect(),
        }
    }
}

/// Why a cell was left unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No header matches the spec's column
    UnknownColumn,
    /// Selected row does not exist
    RowOutOfRange,
    /// Current cell value is not a number
    NonNumericCell,
    /// Operation is not multiply, add or set
    UnknownOperation,
    /// Operand is not a number
    InvalidOperand,
    /// Result is NaN or infinite
    ResultOutOfRange,
}

/// What happened to one (row, spec) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellOutcome {
    Applied {
        row: usize,
        column: String,
        old: String,
        new: String,
    },
    Skipped {
        row: usize,
        column: String,
        reason: SkipReason,
    },
}

/// Per-cell results of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MassEditSummary {
    pub outcomes: Vec<CellOutcome>,
}

impl MassEditSummary {
    /// Number of cells that were updated
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, CellOutcome::Applied { .. }))
            .count()
    }

    /// Number of (row, spec) pairs that were skipped
    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.applied()
    }

    /// True when the batch changed nothing
    pub fn no_changes(&self) -> bool {
        self.applied() == 0
    }

    /// Skips grouped by reason
    pub fn skip_counts(&self) -> Vec<(SkipReason, usize)> {
        let mut counts: Vec<(SkipReason, usize)> = Vec::new();
        for outcome in &self.outcomes {
            if let CellOutcome::Skipped { reason, .. } = outcome {
                match counts.iter_mut().find(|(r, _)| r == reason) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((*reason, 1)),
                }
            }
        }
        counts
    }
}

/// Numeric value of a cell; an empty cell counts as zero
fn cell_number(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return Some(0.0);
    }
    crate::table::CellValue::parse(cell).as_number()
}

/// Truncate toward zero and render as an integer of any magnitude
fn format_truncated(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // -0.5 truncates to -0.0, which should read as plain 0
    let truncated = if truncated == 0.0 { 0.0 } else { truncated };
    Some(format!("{:.0}", truncated))
}

fn edit_cell(table: &mut Table, row: usize, col: usize, spec: &MassEditSpec) -> CellOutcome {
    let skipped = |reason| CellOutcome::Skipped {
        row,
        column: spec.column.clone(),
        reason,
    };

    let Some(current) = table.cell(row, col) else {
        return skipped(SkipReason::RowOutOfRange);
    };
    let Some(current_value) = cell_number(current) else {
        return skipped(SkipReason::NonNumericCell);
    };
    let Some(operation) = Operation::from_name(&spec.operation) else {
        return skipped(SkipReason::UnknownOperation);
    };
    let Some(operand) = parse_operand(&spec.operand) else {
        return skipped(SkipReason::InvalidOperand);
    };
    let Some(new) = format_truncated(operation.apply(current_value, operand)) else {
        return skipped(SkipReason::ResultOutOfRange);
    };

    let old = current.to_string();
    table.rows[row].cells[col].clone_from(&new);
    CellOutcome::Applied {
        row,
        column: spec.column.clone(),
        old,
        new,
    }
}

/// Apply a batch of specs to the selected rows
///
/// Every (row, spec) pair gets an outcome. A spec whose column is not in the
/// header is skipped for every row; bad cells are skipped individually and
/// the batch continues.
pub fn apply_mass_edit(
    table: &mut Table,
    specs: &[MassEditSpec],
    selection: &RowSelection,
) -> MassEditSummary {
    let column_indices: Vec<Option<usize>> = specs
        .iter()
        .map(|spec| table.find_column(&spec.column).map(|c| c.index))
        .collect();

    let mut summary = MassEditSummary::default();
    for row in selection.indices(table.row_count()) {
        for (spec, col) in specs.iter().zip(&column_indices) {
            let outcome = match col {
                Some(col) => edit_cell(table, row, *col, spec),
                None => CellOutcome::Skipped {
                    row,
                    column: spec.column.clone(),
                    reason: SkipReason::UnknownColumn,
                },
            };
            if let CellOutcome::Skipped { reason, .. } = &outcome {
                debug!(row, column = %spec.column, ?reason, "mass edit skipped cell");
            }
            summary.outcomes.push(outcome);
        }
    }

    info!(
        applied = summary.applied(),
        skipped = summary.skipped(),
        "mass edit finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TextEncoding;
    use crate::parser::parse_proto_str;

    fn table() -> Table {
        parse_proto_str(
            "VNUM\tNAME\tEXP\tGOLD_MIN\tTYPE\n\
             101\tWolf\t100\t5\tMONSTER\n\
             102\tBear\t101\t\tMONSTER\n\
             103\tBoss\tlots\t7\tBOSS\n",
            "mob_proto.txt",
            TextEncoding::Utf8,
        )
        .unwrap()
    }

    fn exp(table: &Table) -> Vec<&str> {
        (0..table.row_count())
            .map(|r| table.cell(r, 2).unwrap())
            .collect()
    }

    #[test]
    fn test_multiply_truncates() {
        let mut table = table();
        let summary = apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("EXP", "multiply", "2.5")],
            &RowSelection::Rows([0, 1].into()),
        );

        assert_eq!(summary.applied(), 2);
        assert_eq!(exp(&table), vec!["250", "252", "lots"]);
    }

    #[test]
    fn test_multiply_by_integer() {
        let mut table = table();
        apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("EXP", "multiply", "4")],
            &RowSelection::from_rows([0]),
        );
        assert_eq!(table.cell(0, 2), Some("400"));
        assert_eq!(table.cell(1, 2), Some("101"));
    }

    #[test]
    fn test_empty_cell_counts_as_zero() {
        let mut table = table();
        let summary = apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("GOLD_MIN", "add", "300")],
            &RowSelection::All,
        );

        assert_eq!(summary.applied(), 3);
        assert_eq!(table.cell(0, 3), Some("305"));
        assert_eq!(table.cell(1, 3), Some("300"));
        assert_eq!(table.cell(2, 3), Some("307"));
    }

    #[test]
    fn test_non_numeric_cell_skipped_batch_continues() {
        let mut table = table();
        let summary = apply_mass_edit(
            &mut table,
            &[
                MassEditSpec::new("EXP", "set", "1000"),
                MassEditSpec::new("GOLD_MIN", "set", "600"),
            ],
            &RowSelection::All,
        );

        assert_eq!(summary.applied(), 5);
        assert_eq!(summary.skip_counts(), vec![(SkipReason::NonNumericCell, 1)]);
        assert_eq!(table.cell(2, 2), Some("lots"));
        assert_eq!(table.cell(2, 3), Some("600"));
    }

    #[test]
    fn test_unknown_column_is_no_change() {
        let mut table = table();
        let before = table.clone();
        let summary = apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("MAX_HP", "multiply", "2")],
            &RowSelection::All,
        );

        assert!(summary.no_changes());
        assert_eq!(summary.skip_counts(), vec![(SkipReason::UnknownColumn, 3)]);
        assert_eq!(table, before);
    }

    #[test]
    fn test_unknown_operation_and_bad_operand() {
        let mut table = table();
        let summary = apply_mass_edit(
            &mut table,
            &[
                MassEditSpec::new("EXP", "divide", "2"),
                MassEditSpec::new("EXP", "add", "ten"),
            ],
            &RowSelection::from_rows([0]),
        );

        assert!(summary.no_changes());
        assert_eq!(
            summary.skip_counts(),
            vec![
                (SkipReason::UnknownOperation, 1),
                (SkipReason::InvalidOperand, 1)
            ]
        );
    }

    #[test]
    fn test_negative_results_truncate_toward_zero() {
        let mut table = table();
        apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("EXP", "multiply", "-0.015")],
            &RowSelection::from_rows([0]),
        );
        // 100 * -0.015 = -1.5
        assert_eq!(table.cell(0, 2), Some("-1"));
    }

    #[test]
    fn test_non_finite_result_is_skipped() {
        let mut table = table();
        let summary = apply_mass_edit(
            &mut table,
            &[
                MassEditSpec::new("EXP", "multiply", "inf"),
                MassEditSpec::new("GOLD_MIN", "set", "NaN"),
            ],
            &RowSelection::from_rows([0]),
        );
        assert_eq!(summary.skip_counts(), vec![(SkipReason::ResultOutOfRange, 2)]);
        assert_eq!(table.cell(0, 2), Some("100"));
        assert_eq!(table.cell(0, 3), Some("5"));
    }

    #[test]
    fn test_results_beyond_i64_are_written_in_full() {
        let mut table = table();
        let summary = apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("EXP", "multiply", "1e18")],
            &RowSelection::from_rows([0]),
        );
        assert_eq!(summary.applied(), 1);
        assert_eq!(table.cell(0, 2), Some("100000000000000000000"));
    }

    #[test]
    fn test_small_negative_result_is_zero() {
        let mut table = table();
        apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("EXP", "multiply", "-0.001")],
            &RowSelection::from_rows([0]),
        );
        assert_eq!(table.cell(0, 2), Some("0"));
    }

    #[test]
    fn test_out_of_range_rows_are_reported() {
        let mut table = table();
        let summary = apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("EXP", "add", "1")],
            &RowSelection::from_rows([0, 9]),
        );
        assert_eq!(summary.applied(), 1);
        assert_eq!(summary.skip_counts(), vec![(SkipReason::RowOutOfRange, 1)]);
    }

    #[test]
    fn test_applied_outcome_records_old_and_new() {
        let mut table = table();
        let summary = apply_mass_edit(
            &mut table,
            &[MassEditSpec::new("EXP", "add", "1")],
            &RowSelection::from_rows([1]),
        );
        assert_eq!(
            summary.outcomes,
            vec![CellOutcome::Applied {
                row: 1,
                column: "EXP".to_string(),
                old: "101".to_string(),
                new: "102".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_triple_and_validate() {
        let spec = MassEditSpec::parse_triple("EXP:multiply:4").unwrap();
        assert_eq!(spec, MassEditSpec::new("EXP", "multiply", "4"));
        assert!(spec.validate().is_ok());

        assert!(MassEditSpec::parse_triple("EXP:multiply").is_err());
        assert!(MassEditSpec::new("EXP", "divide", "4").validate().is_err());
        assert!(MassEditSpec::new("EXP", "set", "x").validate().is_err());
    }

    #[test]
    fn test_mass_edit_file_serialization() {
        let mut file = MassEditFile::new();
        file.add_edit(MassEditSpec::new("EXP", "multiply", "2"));
        file.add_edit(MassEditSpec::new("GOLD_MAX", "set", "600"));

        let json = serde_json::to_string_pretty(&file).unwrap();
        let loaded: MassEditFile = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, file);
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_operation_names() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("Multiply"), None);
    }
}
