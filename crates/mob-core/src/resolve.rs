//! Display-name resolution for loaded rows

use crate::names::NameLookup;
use crate::table::{Table, NAME_COLUMN};
use serde::{Deserialize, Serialize};

/// Name values that mean "unknown" in mob_proto files
pub const PLACEHOLDER_NAMES: &[&str] = &["??", "???", "????"];

/// Where a displayed name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameSource {
    /// Found in the names lookup
    Lookup,
    /// The row's own NAME value
    Original,
    /// Built from the id because nothing better was available
    Synthesized,
}

/// The name shown for one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedName {
    pub display: String,
    pub source: NameSource,
}

/// Pick the display name for a row id
pub fn resolve_name(id: &str, original: &str, lookup: &NameLookup) -> ResolvedName {
    if let Some(name) = lookup.get(id) {
        ResolvedName {
            display: name.to_string(),
            source: NameSource::Lookup,
        }
    } else if !original.is_empty() && !PLACEHOLDER_NAMES.contains(&original) {
        ResolvedName {
            display: original.to_string(),
            source: NameSource::Original,
        }
    } else {
        ResolvedName {
            display: format!("Mob {}", id),
            source: NameSource::Synthesized,
        }
    }
}

/// Display names for every row of a table
///
/// Empty when the table's second column is not `NAME`; in that case every
/// cell displays its stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameResolution {
    pub names: Vec<ResolvedName>,
}

impl NameResolution {
    /// Whether name substitution applies to the table
    pub fn is_active(&self) -> bool {
        !self.names.is_empty()
    }

    /// Display name for a row
    pub fn display_name(&self, row: usize) -> Option<&str> {
        self.names.get(row).map(|n| n.display.as_str())
    }

    /// Value shown in the grid for a cell
    pub fn display_cell<'a>(&'a self, table: &'a Table, row: usize, col: usize) -> Option<&'a str> {
        if col == NAME_COLUMN {
            if let Some(name) = self.display_name(row) {
                return Some(name);
            }
        }
        table.cell(row, col)
    }

    /// Count rows whose name came from `source`
    pub fn count(&self, source: NameSource) -> usize {
        self.names.iter().filter(|n| n.source == source).count()
    }

    /// Replace the display name of one row
    pub fn set_display(&mut self, row: usize, display: String, source: NameSource) {
        if let Some(entry) = self.names.get_mut(row) {
            *entry = ResolvedName { display, source };
        }
    }
}

/// Resolve display names for every row
///
/// The resolved name is also written into the row itself, so the table is
/// permanently altered and a later save stores what the grid showed.
/// Running this again with the same lookup produces the same names.
pub fn resolve_names(table: &mut Table, lookup: &NameLookup) -> NameResolution {
    if !table.has_name_column() {
        return NameResolution::default();
    }

    let names = table
        .rows
        .iter_mut()
        .map(|row| {
            let resolved = resolve_name(row.id(), row.get(NAME_COLUMN).unwrap_or(""), lookup);
            if let Some(cell) = row.cells.get_mut(NAME_COLUMN) {
                cell.clone_from(&resolved.display);
            }
            resolved
        })
        .collect();

    NameResolution { names }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TextEncoding;
    use crate::parser::parse_proto_str;

    fn lookup() -> NameLookup {
        let mut lookup = NameLookup::new();
        lookup.insert("9001", "Höllenwolf");
        lookup
    }

    #[test]
    fn test_lookup_hit_overwrites_row() {
        let mut table =
            parse_proto_str("VNUM\tNAME\n9001\t????\n", "p.txt", TextEncoding::Utf8).unwrap();
        let resolution = resolve_names(&mut table, &lookup());

        assert_eq!(resolution.display_name(0), Some("Höllenwolf"));
        assert_eq!(table.cell(0, 1), Some("Höllenwolf"));
        assert_eq!(resolution.count(NameSource::Lookup), 1);
    }

    #[test]
    fn test_missing_id_with_empty_name_is_synthesized() {
        let mut table =
            parse_proto_str("VNUM\tNAME\tEXP\n9999\n", "p.txt", TextEncoding::Utf8).unwrap();
        let resolution = resolve_names(&mut table, &lookup());

        assert_eq!(resolution.display_name(0), Some("Mob 9999"));
        assert_eq!(resolution.names[0].source, NameSource::Synthesized);
        assert_eq!(table.cell(0, 1), Some("Mob 9999"));
    }

    #[test]
    fn test_placeholders_and_original_names() {
        for placeholder in PLACEHOLDER_NAMES {
            let resolved = resolve_name("5", placeholder, &NameLookup::new());
            assert_eq!(resolved.display, "Mob 5");
        }

        let resolved = resolve_name("5", "?", &NameLookup::new());
        assert_eq!(resolved.display, "?");
        assert_eq!(resolved.source, NameSource::Original);
    }

    #[test]
    fn test_no_substitution_without_name_header() {
        let mut table =
            parse_proto_str("VNUM\tLOCALE_NAME\n9001\t????\n", "p.txt", TextEncoding::Utf8)
                .unwrap();
        let resolution = resolve_names(&mut table, &lookup());

        assert!(!resolution.is_active());
        assert_eq!(table.cell(0, 1), Some("????"));
        assert_eq!(resolution.display_cell(&table, 0, 1), Some("????"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut table = parse_proto_str(
            "VNUM\tNAME\n9001\t????\n9999\t\n42\tGoblin\n",
            "p.txt",
            TextEncoding::Utf8,
        )
        .unwrap();

        let first = resolve_names(&mut table, &lookup());
        let rows_after_first = table.rows.clone();
        let second = resolve_names(&mut table, &lookup());

        let displays = |r: &NameResolution| -> Vec<String> {
            r.names.iter().map(|n| n.display.clone()).collect()
        };
        assert_eq!(displays(&first), vec!["Höllenwolf", "Mob 9999", "Goblin"]);
        assert_eq!(displays(&second), displays(&first));
        assert_eq!(table.rows, rows_after_first);
        // The stored synthesized name now reads as the row's own name
        assert_eq!(second.names[1].source, NameSource::Original);
    }

    #[test]
    fn test_display_cell_uses_resolved_name() {
        let mut table =
            parse_proto_str("VNUM\tNAME\tEXP\n7\t??\t10\n", "p.txt", TextEncoding::Utf8).unwrap();
        let resolution = resolve_names(&mut table, &NameLookup::new());

        assert_eq!(resolution.display_cell(&table, 0, 1), Some("Mob 7"));
        assert_eq!(resolution.display_cell(&table, 0, 2), Some("10"));
        assert_eq!(resolution.display_cell(&table, 1, 0), None);
    }

    #[test]
    fn test_placeholder_row_stores_synthesized_name() {
        let mut table =
            parse_proto_str("VNUM\tNAME\tEXP\n9999\t????\t1\n", "p.txt", TextEncoding::Utf8)
                .unwrap();
        resolve_names(&mut table, &NameLookup::new());

        assert_eq!(table.rows[0].cells, vec!["9999", "Mob 9999", "1"]);
    }
}
