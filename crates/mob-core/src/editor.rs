//! Editor session: the state behind one editor window
//!
//! Holds the loaded table, the names lookup and the current display names,
//! and exposes the user actions (open, save, fix names, mass edit, search,
//! cell edits). Every action either completes or returns an error; a failed
//! open leaves the previously loaded table in place.

use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::mass_edit::{
    apply_mass_edit, CellOutcome, MassEditSpec, MassEditSummary, RowSelection,
};
use crate::names::{default_names_path, load_names, NameLookup, NAMES_FILE_NAME};
use crate::parser::load_proto;
use crate::repair::{repair_names_file, RepairReport};
use crate::resolve::{resolve_names, NameResolution, NameSource};
use crate::search::search_rows;
use crate::table::{Table, NAME_COLUMN};
use crate::writer::{save_table, SaveReport};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Summary of an open action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub path: PathBuf,
    pub encoding: TextEncoding,
    pub rows: usize,
    pub columns: usize,
    /// Rows whose name came from the names lookup
    pub names_from_lookup: usize,
}

#[derive(Debug, Default)]
pub struct Editor {
    table: Option<Table>,
    names: NameLookup,
    names_path: Option<PathBuf>,
    resolution: NameResolution,
}

impl Editor {
    /// Create an editor with no table and no names
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor and load names from `names_path` right away
    pub fn with_names_file<P: AsRef<Path>>(names_path: P) -> Self {
        let mut editor = Self::new();
        editor.load_names_from(names_path);
        editor
    }

    /// (Re)load the names lookup. Read errors are logged and leave the
    /// lookup empty. Returns the number of names loaded.
    pub fn load_names_from<P: AsRef<Path>>(&mut self, names_path: P) -> usize {
        let path = names_path.as_ref().to_path_buf();
        self.names = match load_names(&path) {
            Ok(load) => load.parse.lookup,
            Err(e) => {
                warn!(error = %e, "could not load names file");
                NameLookup::new()
            }
        };
        self.names_path = Some(path);
        self.refresh_names();
        self.names.len()
    }

    pub fn names_path(&self) -> Option<&Path> {
        self.names_path.as_deref()
    }

    pub fn names(&self) -> &NameLookup {
        &self.names
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn resolution(&self) -> &NameResolution {
        &self.resolution
    }

    /// Load a mob_proto file, replacing the current table
    ///
    /// When no names file has been chosen yet, `mob_names.txt` beside the
    /// proto file is used.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<LoadReport> {
        let path = path.as_ref();
        let mut table = load_proto(path)?;

        if self.names_path.is_none() {
            self.load_names_from(default_names_path(path));
        }

        self.resolution = resolve_names(&mut table, &self.names);
        let report = LoadReport {
            path: path.to_path_buf(),
            encoding: table.encoding,
            rows: table.row_count(),
            columns: table.column_count(),
            names_from_lookup: self.resolution.count(NameSource::Lookup),
        };
        self.table = Some(table);
        Ok(report)
    }

    /// Save to the file the table was loaded from
    pub fn save(&mut self) -> Result<SaveReport> {
        let table = self.table.as_ref().ok_or(Error::NoTableLoaded)?;
        save_table(table, &table.source_path)
    }

    /// Save to `path`, which becomes the table's file from now on
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<SaveReport> {
        let table = self.table.as_mut().ok_or(Error::NoTableLoaded)?;
        let report = save_table(table, path.as_ref())?;
        table.source_path = path.as_ref().to_path_buf();
        Ok(report)
    }

    /// Repair the names file and re-resolve the loaded table against it
    pub fn fix_names(&mut self) -> Result<RepairReport> {
        let path = self
            .names_path
            .clone()
            .ok_or_else(|| Error::NamesFileMissing(PathBuf::from(NAMES_FILE_NAME)))?;

        let (report, lookup) = repair_names_file(&path)?;
        self.names = lookup;
        self.refresh_names();
        Ok(report)
    }

    /// Apply a mass-edit batch to the selected rows
    pub fn mass_edit(
        &mut self,
        specs: &[MassEditSpec],
        selection: &RowSelection,
    ) -> Result<MassEditSummary> {
        let table = self.table.as_mut().ok_or(Error::NoTableLoaded)?;
        let summary = apply_mass_edit(table, specs, selection);

        // An edited NAME cell shows its new value
        if self.resolution.is_active() {
            for outcome in &summary.outcomes {
                if let CellOutcome::Applied { row, column, new, .. } = outcome {
                    if table.find_column(column).is_some_and(|c| c.index == NAME_COLUMN) {
                        self.resolution
                            .set_display(*row, new.clone(), NameSource::Original);
                    }
                }
            }
        }
        Ok(summary)
    }

    /// Overwrite one cell, as typed into the grid
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let table = self.table.as_mut().ok_or(Error::NoTableLoaded)?;
        let value = value.into();
        table.set_cell(row, col, value.clone())?;
        if col == NAME_COLUMN {
            self.resolution.set_display(row, value, NameSource::Original);
        }
        Ok(())
    }

    /// Value shown in the grid for a cell
    pub fn display_cell(&self, row: usize, col: usize) -> Option<&str> {
        let table = self.table.as_ref()?;
        self.resolution.display_cell(table, row, col)
    }

    /// Rows matching a search query
    pub fn search(&self, query: &str) -> Vec<usize> {
        match &self.table {
            Some(table) => search_rows(table, &self.resolution, query),
            None => Vec::new(),
        }
    }

    fn refresh_names(&mut self) {
        if let Some(table) = self.table.as_mut() {
            self.resolution = resolve_names(table, &self.names);
        }
    }
}
