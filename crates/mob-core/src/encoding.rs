//! Text encoding detection with ordered fallback chains
//!
//! Files are decoded by trying a fixed list of candidate encodings in order.
//! The first candidate that decodes the whole content without an error wins;
//! there is no scoring between candidates. When every candidate fails the
//! content is decoded as UTF-8 with invalid sequences replaced by U+FFFD, so
//! callers always get text back.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A text encoding that can be tried during detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextEncoding {
    /// Korean code page 949 (Unified Hangul Code, superset of EUC-KR)
    Cp949,
    /// Strict EUC-KR (KS X 1001 only)
    EucKr,
    /// UTF-8, a leading byte-order mark is kept as U+FEFF
    Utf8,
    /// UTF-8 with an optional byte-order mark that is stripped
    Utf8Sig,
    /// ISO-8859-1 under its short name
    Latin1,
    /// ISO-8859-1
    Iso8859_1,
    /// Windows code page 1252
    Windows1252,
    /// Last-resort UTF-8 decode with replacement characters
    LossyUtf8,
}

/// Candidate order for the primary mob_proto file
pub const PROTO_ENCODINGS: &[TextEncoding] = &[
    TextEncoding::Cp949,
    TextEncoding::EucKr,
    TextEncoding::Utf8,
    TextEncoding::Utf8Sig,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

/// Candidate order for the mob_names lookup file
pub const NAMES_ENCODINGS: &[TextEncoding] = &[
    TextEncoding::Windows1252,
    TextEncoding::Iso8859_1,
    TextEncoding::Utf8,
    TextEncoding::Cp949,
    TextEncoding::Latin1,
];

/// Bytes that have no mapping in code page 1252
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl TextEncoding {
    /// Conventional name of the encoding
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Cp949 => "cp949",
            TextEncoding::EucKr => "euc-kr",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Iso8859_1 => "iso-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
            TextEncoding::LossyUtf8 => "utf-8 (lossy)",
        }
    }

    /// Decode `bytes` completely, returning `None` on the first malformed
    /// or unmappable sequence.
    pub fn decode_strict(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Cp949 => encoding_rs::EUC_KR
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            TextEncoding::EucKr => {
                if !is_ks_x_1001(bytes) {
                    return None;
                }
                encoding_rs::EUC_KR
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
            }
            TextEncoding::Utf8 => encoding_rs::UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                TextEncoding::Utf8.decode_strict(body)
            }
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
                Some(bytes.iter().map(|&b| char::from(b)).collect())
            }
            TextEncoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                encoding_rs::WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
            }
            TextEncoding::LossyUtf8 => Some(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text decoded from raw bytes together with the encoding that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Decode with the first candidate that succeeds, falling back to a lossy
/// UTF-8 decode. Never fails.
pub fn decode_with(bytes: &[u8], candidates: &[TextEncoding]) -> DecodedText {
    for &encoding in candidates {
        match encoding.decode_strict(bytes) {
            Some(text) => {
                debug!(encoding = encoding.name(), "decoded content");
                return DecodedText { text, encoding };
            }
            None => debug!(encoding = encoding.name(), "decode failed, trying next"),
        }
    }

    debug!("all candidate encodings failed, decoding lossily");
    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: TextEncoding::LossyUtf8,
    }
}

/// Try candidates in order, handing each successful decode to `accept`.
/// The first candidate for which `accept` returns `Some` wins.
pub fn decode_until<T>(
    bytes: &[u8],
    candidates: &[TextEncoding],
    mut accept: impl FnMut(&str) -> Option<T>,
) -> Option<(T, TextEncoding)> {
    candidates.iter().find_map(|&encoding| {
        let text = encoding.decode_strict(bytes)?;
        match accept(&text) {
            Some(value) => Some((value, encoding)),
            None => {
                debug!(encoding = encoding.name(), "decoded content rejected, trying next");
                None
            }
        }
    })
}

/// Read a file and decode it with [`decode_with`]
pub fn read_decoded<P: AsRef<Path>>(path: P, candidates: &[TextEncoding]) -> Result<DecodedText> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(decode_with(&bytes, candidates))
}

/// Every non-ASCII byte pair lies in the KS X 1001 range 0xA1..=0xFE
fn is_ks_x_1001(bytes: &[u8]) -> bool {
    let mut iter = bytes.iter();
    while let Some(&lead) = iter.next() {
        if lead < 0x80 {
            continue;
        }
        if !(0xA1..=0xFE).contains(&lead) {
            return false;
        }
        match iter.next() {
            Some(trail) if (0xA1..=0xFE).contains(trail) => {}
            _ => return false,
        }
    }
    true
}
