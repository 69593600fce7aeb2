//! mob-core: Core library for editing Metin2 mob_proto tables
//!
//! This library provides functionality to:
//! - Decode mob_proto.txt and mob_names.txt with ordered encoding fallbacks
//! - Parse the tab-delimited table into a header and padded rows
//! - Resolve display names from the mob_names lookup
//! - Apply bulk numeric edits with per-cell outcomes
//! - Save tables as UTF-8 behind a timestamped backup
//! - Repair mis-encoded names files

pub mod catalog;
pub mod editor;
pub mod encoding;
pub mod error;
pub mod mass_edit;
pub mod names;
pub mod parser;
pub mod repair;
pub mod resolve;
pub mod search;
pub mod table;
pub mod writer;

pub use catalog::{editable_columns, EditableColumn, Preset, COMMON_COLUMNS};
pub use editor::{Editor, LoadReport};
pub use encoding::{decode_with, DecodedText, TextEncoding, NAMES_ENCODINGS, PROTO_ENCODINGS};
pub use error::{Error, Result};
pub use mass_edit::{
    apply_mass_edit, CellOutcome, MassEditFile, MassEditSpec, MassEditSummary, Operation,
    RowSelection, SkipReason,
};
pub use names::{default_names_path, load_names, NameLookup, NamesLoad};
pub use parser::{load_proto, parse_proto_str};
pub use repair::{repair_names_file, RepairReport};
pub use resolve::{resolve_names, NameResolution, NameSource, ResolvedName};
pub use search::search_rows;
pub use table::{CellValue, Column, Row, Table};
pub use writer::{save_table, SaveReport};
