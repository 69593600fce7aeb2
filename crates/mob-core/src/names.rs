//! Mob name lookup loaded from mob_names.txt
//!
//! The names file is a tab-separated list of `VNUM<TAB>NAME` lines after a
//! header line. Names often arrive mis-decoded (UTF-8 read as code page 1252,
//! or bytes already lost to U+FFFD), so every name passes through a fixed
//! list of literal replacements before it is stored.

use crate::encoding::{decode_until, TextEncoding, NAMES_ENCODINGS};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default file name of the lookup file
pub const NAMES_FILE_NAME: &str = "mob_names.txt";

/// Character-level repairs: UTF-8 umlauts that were decoded as code page 1252
///
/// Each entry matches a specific two-character mojibake sequence rather than
/// mapping every U+FFFD to one umlaut, so unrelated characters are left alone.
pub const CHARACTER_FIXES: &[(&str, &str)] = &[
    ("Ã¤", "ä"),
    ("Ã¶", "ö"),
    ("Ã¼", "ü"),
    ("Ã„", "Ä"),
    ("Ã–", "Ö"),
    ("Ãœ", "Ü"),
    ("ÃŸ", "ß"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
];

/// Word-level repairs for names whose umlaut was already replaced by U+FFFD
pub const WORD_FIXES: &[(&str, &str)] = &[
    ("k\u{FFFD}mpfer", "kämpfer"),
    ("anf\u{FFFD}hrer", "anführer"),
    ("B\u{FFFD}ser", "Böser"),
    ("f\u{FFFD}r", "für"),
];

/// Further word-level repairs applied only when rewriting the names file
pub const EXTENDED_WORD_FIXES: &[(&str, &str)] = &[
    ("\u{FFFD}ber", "über"),
    ("gr\u{FFFD}\u{FFFD}er", "größer"),
    ("w\u{FFFD}tend", "wütend"),
    ("sch\u{FFFD}n", "schön"),
];

fn apply_fixes(text: &str, tables: &[&[(&str, &str)]]) -> String {
    let mut fixed = text.to_string();
    for table in tables {
        for (broken, correct) in table.iter() {
            if fixed.contains(broken) {
                fixed = fixed.replace(broken, correct);
            }
        }
    }
    fixed
}

/// Repair a single name: character fixes first, then word fixes
pub fn fix_name(name: &str) -> String {
    apply_fixes(name, &[CHARACTER_FIXES, WORD_FIXES])
}

/// Repair a line of the names file with the full repair table
pub fn fix_line(line: &str) -> String {
    apply_fixes(line, &[CHARACTER_FIXES, WORD_FIXES, EXTENDED_WORD_FIXES])
}

/// Mapping from VNUM text to display name
///
/// Keys are compared as strings, so "0101" and "101" are different ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameLookup {
    names: HashMap<String, String>,
}

impl NameLookup {
    /// Create a new empty lookup
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a name, returning the one it replaced
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) -> Option<String> {
        self.names.insert(id.into(), name.into())
    }

    /// Look up a name by id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Iterate over (id, name) pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Why a line of the names file produced no entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineSkip {
    /// Line is empty after trimming
    Blank,
    /// Line has no tab separator
    NoTab,
    /// Line has a tab but only one field once trimmed
    SingleField,
}

/// A line that was skipped, numbered from 1 like the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: LineSkip,
}

/// Result of parsing one decoded names file
#[derive(Debug, Clone, Default)]
pub struct NamesParse {
    pub lookup: NameLookup,
    pub skipped: Vec<SkippedLine>,
}

/// Outcome of loading the names file from disk
#[derive(Debug, Clone, Default)]
pub struct NamesLoad {
    pub parse: NamesParse,
    /// Encoding whose parse produced entries, `None` if nothing was loaded
    pub encoding: Option<TextEncoding>,
}

/// Parse decoded names-file text. The first line is always discarded.
pub fn parse_names_str(content: &str) -> NamesParse {
    let mut parse = NamesParse::default();

    for (idx, raw) in universal_lines(content).enumerate().skip(1) {
        let line = raw.trim();
        let reason = if line.is_empty() {
            Some(LineSkip::Blank)
        } else if !raw.contains('\t') {
            Some(LineSkip::NoTab)
        } else {
            let mut parts = line.split('\t');
            match (parts.next(), parts.next()) {
                (Some(id), Some(name)) => {
                    parse.lookup.insert(id.trim(), fix_name(name.trim()));
                    None
                }
                _ => Some(LineSkip::SingleField),
            }
        };

        if let Some(reason) = reason {
            parse.skipped.push(SkippedLine {
                line: idx + 1,
                reason,
            });
        }
    }

    parse
}

/// Decode and parse names-file bytes, trying each candidate encoding until
/// one yields at least one entry
pub fn parse_names_bytes(bytes: &[u8]) -> NamesLoad {
    match decode_until(bytes, NAMES_ENCODINGS, |text| {
        let parse = parse_names_str(text);
        (!parse.lookup.is_empty()).then_some(parse)
    }) {
        Some((parse, encoding)) => NamesLoad {
            parse,
            encoding: Some(encoding),
        },
        None => NamesLoad::default(),
    }
}

/// Load the names file. A missing file yields an empty lookup.
pub fn load_names<P: AsRef<Path>>(path: P) -> Result<NamesLoad> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "names file not found, using id fallback names");
            return Ok(NamesLoad::default());
        }
        Err(e) => {
            return Err(Error::FileRead {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let load = parse_names_bytes(&bytes);
    match load.encoding {
        Some(encoding) => info!(
            path = %path.display(),
            encoding = %encoding,
            names = load.parse.lookup.len(),
            skipped = load.parse.skipped.len(),
            "loaded mob names"
        ),
        None => debug!(path = %path.display(), "names file produced no entries"),
    }
    Ok(load)
}

/// The names file that sits beside a mob_proto file
pub fn default_names_path<P: AsRef<Path>>(proto_path: P) -> PathBuf {
    match proto_path.as_ref().parent() {
        Some(dir) => dir.join(NAMES_FILE_NAME),
        None => PathBuf::from(NAMES_FILE_NAME),
    }
}

/// Split on `\r\n`, `\n` or a lone `\r`; like `str::lines`, a final
/// line terminator does not produce an empty last line
pub(crate) fn universal_lines(content: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(content);
    std::iter::from_fn(move || {
        let text = rest?;
        if text.is_empty() {
            rest = None;
            return None;
        }
        match text.find(['\r', '\n']) {
            Some(pos) => {
                let skip = if text[pos..].starts_with("\r\n") { 2 } else { 1 };
                rest = Some(&text[pos + skip..]);
                Some(&text[..pos])
            }
            None => {
                rest = None;
                Some(text)
            }
        }
    })
}
