//! Numeric columns offered for mass editing

use crate::mass_edit::{MassEditSpec, Operation};
use crate::table::Table;

/// A one-click value for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub label: &'static str,
    pub operation: Operation,
    pub operand: &'static str,
}

impl Preset {
    /// Build the spec this preset stands for
    pub fn to_spec(&self, column: &str) -> MassEditSpec {
        MassEditSpec::new(column, self.operation.name(), self.operand)
    }
}

/// A column commonly changed in bulk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditableColumn {
    pub name: &'static str,
    pub description: &'static str,
    pub presets: &'static [Preset],
}

const EXP_PRESETS: &[Preset] = &[
    Preset {
        label: "x2",
        operation: Operation::Multiply,
        operand: "2",
    },
    Preset {
        label: "x4",
        operation: Operation::Multiply,
        operand: "4",
    },
];

const GOLD_PRESETS: &[Preset] = &[
    Preset {
        label: "300",
        operation: Operation::Set,
        operand: "300",
    },
    Preset {
        label: "600",
        operation: Operation::Set,
        operand: "600",
    },
];

const fn column(name: &'static str, description: &'static str) -> EditableColumn {
    EditableColumn {
        name,
        description,
        presets: &[],
    }
}

pub const COMMON_COLUMNS: &[EditableColumn] = &[
    EditableColumn {
        name: "EXP",
        description: "Experience points",
        presets: EXP_PRESETS,
    },
    EditableColumn {
        name: "GOLD_MIN",
        description: "Minimum gold drop",
        presets: GOLD_PRESETS,
    },
    EditableColumn {
        name: "GOLD_MAX",
        description: "Maximum gold drop",
        presets: GOLD_PRESETS,
    },
    column("LEVEL", "Mob level"),
    column("MAX_HP", "Health points"),
    column("DAMAGE_MIN", "Minimum damage"),
    column("DAMAGE_MAX", "Maximum damage"),
    column("DEF", "Defense"),
    column("ATTACK_SPEED", "Attack speed"),
    column("MOVE_SPEED", "Movement speed"),
    column("ST", "Strength"),
    column("DX", "Dexterity"),
    column("HT", "Health"),
    column("IQ", "Intelligence"),
];

/// Catalog columns present in the table's header, in catalog order
pub fn editable_columns(table: &Table) -> Vec<&'static EditableColumn> {
    COMMON_COLUMNS
        .iter()
        .filter(|c| table.find_column(c.name).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TextEncoding;
    use crate::parser::parse_proto_str;

    #[test]
    fn test_only_present_columns_offered() {
        let table = parse_proto_str(
            "VNUM\tNAME\tIQ\tEXP\tRANK\n",
            "p.txt",
            TextEncoding::Utf8,
        )
        .unwrap();
        let names: Vec<&str> = editable_columns(&table).iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["EXP", "IQ"]);
    }

    #[test]
    fn test_presets_build_valid_specs() {
        for column in COMMON_COLUMNS {
            for preset in column.presets {
                let spec = preset.to_spec(column.name);
                assert!(spec.validate().is_ok(), "{:?}", spec);
            }
        }
        assert_eq!(
            EXP_PRESETS[1].to_spec("EXP"),
            MassEditSpec::new("EXP", "multiply", "4")
        );
    }
}
