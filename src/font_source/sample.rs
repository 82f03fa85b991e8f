//! Sample decoding
//!
//! Every scanned glyph arrives as an outline file whose name carries the text
//! line it was written on, its position on that line, its bounding box in
//! scan pixels and the code points it represents:
//!
//! ```text
//! char_L2_P2_x378_y1471_x766_y1734_RQ==.svg
//! ```
//!
//! The trailing token is base64 over the UTF-8 bytes of the target text.

use base64::Engine as _;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::config::{SampleAlias, SampleChoice};
use crate::font_source::glyph_names;

/// File names must start with this to be picked up from an input directory.
pub const SAMPLE_PREFIX: &str = "char_";

/// Errors that make a sample identifier unusable. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed sample identifier '{identifier}': {reason}")]
    Malformed {
        identifier: String,
        reason: &'static str,
    },
    #[error("sample identifier '{identifier}' has a non-integer {field} field")]
    InvalidInteger {
        identifier: String,
        field: &'static str,
    },
    #[error("sample identifier '{identifier}' has an undecodable payload: {source}")]
    Payload {
        identifier: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("sample identifier '{identifier}' payload is not UTF-8 text")]
    InvalidUtf8 { identifier: String },
    #[error("sample identifier '{identifier}' contains an unpaired surrogate U+{unit:04X}")]
    UnpairedSurrogate { identifier: String, unit: u32 },
    #[error("sample identifier '{identifier}' decodes to no code points")]
    Empty { identifier: String },
    #[error("failed to read sample directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Bounding box of a sample in scan pixel space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelBox {
    pub fn width(&self) -> f64 {
        f64::from(self.x1 - self.x0)
    }

    pub fn height(&self) -> f64 {
        f64::from(self.y1 - self.y0)
    }
}

/// One decoded handwriting sample. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub line: i32,
    /// `None` for samples synthesized from another sample's scan.
    pub position: Option<i32>,
    pub bbox: PixelBox,
    /// Never empty.
    pub codepoints: Vec<char>,
    pub outline_ref: PathBuf,
}

/// What kind of glyph a sample produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleKind {
    /// One encoded code point.
    Single(char),
    /// `X.suffix` alternate of the base letter `X`, left unencoded.
    Variant { base: char, suffix: String },
    /// Two or more code points written as one shape.
    Ligature,
}

impl Sample {
    /// Decode the sample whose outline lives at `path`.
    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| DecodeError::Malformed {
                identifier: path.display().to_string(),
                reason: "file name is not valid UTF-8",
            })?;
        let decoded = decode_identifier(stem)?;
        Ok(Self {
            line: decoded.line,
            position: Some(decoded.position),
            bbox: decoded.bbox,
            codepoints: decoded.codepoints,
            outline_ref: path.to_path_buf(),
        })
    }

    /// The target text as a string.
    pub fn text(&self) -> String {
        self.codepoints.iter().collect()
    }

    pub fn kind(&self) -> SampleKind {
        match self.codepoints.as_slice() {
            [single] => SampleKind::Single(*single),
            [base, '.', rest @ ..] if !rest.is_empty() => SampleKind::Variant {
                base: *base,
                suffix: rest.iter().collect(),
            },
            _ => SampleKind::Ligature,
        }
    }

    /// Name of the glyph this sample becomes.
    pub fn glyph_name(&self) -> String {
        match self.kind() {
            SampleKind::Single(c) => glyph_names::glyph_name(c),
            SampleKind::Variant { .. } => self.text(),
            SampleKind::Ligature => glyph_names::ligature_name(&self.codepoints),
        }
    }
}

/// The fields carried by a sample identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedIdentifier {
    pub line: i32,
    pub position: i32,
    pub bbox: PixelBox,
    pub codepoints: Vec<char>,
}

/// Parse `char_L<line>_P<position>_x<x0>_y<y0>_x<x1>_y<y1>_<payload>`.
pub fn decode_identifier(identifier: &str) -> Result<DecodedIdentifier, DecodeError> {
    let malformed = |reason| DecodeError::Malformed {
        identifier: identifier.to_string(),
        reason,
    };
    let rest = identifier
        .strip_prefix(SAMPLE_PREFIX)
        .ok_or_else(|| malformed("missing 'char_' prefix"))?;

    let fields: Vec<&str> = rest.splitn(7, '_').collect();
    let [line, position, x0, y0, x1, y1, payload] = fields.as_slice() else {
        return Err(malformed("expected six numeric fields and a payload"));
    };

    let number = |field: &str, tag: char, name: &'static str| -> Result<i32, DecodeError> {
        let digits = field
            .strip_prefix(tag)
            .ok_or_else(|| malformed("field tag out of order"))?;
        digits.parse().map_err(|_| DecodeError::InvalidInteger {
            identifier: identifier.to_string(),
            field: name,
        })
    };

    let line = number(line, 'L', "line")?;
    let position = number(position, 'P', "position")?;
    let bbox = PixelBox {
        x0: number(x0, 'x', "x0")?,
        y0: number(y0, 'y', "y0")?,
        x1: number(x1, 'x', "x1")?,
        y1: number(y1, 'y', "y1")?,
    };
    if payload.is_empty() {
        return Err(malformed("empty payload"));
    }
    let codepoints = decode_payload(identifier, payload)?;

    Ok(DecodedIdentifier {
        line,
        position,
        bbox,
        codepoints,
    })
}

fn decode_payload(identifier: &str, payload: &str) -> Result<Vec<char>, DecodeError> {
    use base64::engine::general_purpose::{STANDARD, URL_SAFE};

    let bytes = STANDARD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(|source| DecodeError::Payload {
            identifier: identifier.to_string(),
            source,
        })?;
    let units = decode_units(&bytes).ok_or_else(|| DecodeError::InvalidUtf8 {
        identifier: identifier.to_string(),
    })?;
    let codepoints = assemble_codepoints(&units).map_err(|unit| DecodeError::UnpairedSurrogate {
        identifier: identifier.to_string(),
        unit,
    })?;
    if codepoints.is_empty() {
        return Err(DecodeError::Empty {
            identifier: identifier.to_string(),
        });
    }
    Ok(codepoints)
}

/// Decode UTF-8 into scalar units, tolerating encoded surrogate halves
/// (three-byte `ED A0..BF xx` sequences) so they can be paired afterwards.
fn decode_units(bytes: &[u8]) -> Option<Vec<u32>> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some(text.chars().map(u32::from).collect());
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        let (len, initial) = match lead {
            0x00..=0x7F => (1, u32::from(lead)),
            0xC0..=0xDF => (2, u32::from(lead & 0x1F)),
            0xE0..=0xEF => (3, u32::from(lead & 0x0F)),
            0xF0..=0xF7 => (4, u32::from(lead & 0x07)),
            _ => return None,
        };
        let tail = bytes.get(i + 1..i + len)?;
        let mut unit = initial;
        for &b in tail {
            if b & 0xC0 != 0x80 {
                return None;
            }
            unit = (unit << 6) | u32::from(b & 0x3F);
        }
        units.push(unit);
        i += len;
    }
    Some(units)
}

/// Merge surrogate pairs into supplementary-plane code points.
///
/// A low surrogate must directly follow a high surrogate; the offending unit is
/// returned otherwise.
fn assemble_codepoints(units: &[u32]) -> Result<Vec<char>, u32> {
    let mut merged: Vec<u32> = Vec::with_capacity(units.len());
    for &unit in units {
        if (0xDC00..=0xDFFF).contains(&unit) {
            match merged.last_mut() {
                Some(prev) if (0xD800..=0xDBFF).contains(prev) => {
                    *prev = (((*prev & 0x03FF) << 10) | (unit & 0x03FF)) + 0x10000;
                }
                _ => return Err(unit),
            }
        } else {
            merged.push(unit);
        }
    }
    merged
        .into_iter()
        .map(|unit| char::from_u32(unit).ok_or(unit))
        .collect()
}

/// Decode every `char_*` file in `dir`, sorted by path.
pub fn decode_directory(dir: &Path) -> Result<Vec<Sample>, DecodeError> {
    let io_err = |source| DecodeError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_sample = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(SAMPLE_PREFIX));
        if is_sample && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let samples = paths
        .iter()
        .map(|p| Sample::from_path(p))
        .collect::<Result<Vec<_>, _>>()?;
    debug!("Decoded {} samples from {:?}", samples.len(), dir);
    Ok(samples)
}

/// Append synthetic samples that re-use another sample's scan for a second
/// target text. Aliases are produced in source order after the real samples.
pub fn apply_aliases(samples: &mut Vec<Sample>, aliases: &[SampleAlias]) {
    let mut extra = Vec::new();
    for sample in samples.iter() {
        let text = sample.text();
        for alias in aliases {
            let line_matches = alias.line.is_none_or(|line| line == sample.line);
            if alias.source == text && line_matches {
                extra.push(Sample {
                    position: None,
                    codepoints: alias.target.chars().collect(),
                    ..sample.clone()
                });
            }
        }
    }
    samples.extend(extra);
}

/// Drop samples rejected by the selection table: a choice with a line keeps
/// only the sample written on that line, a choice without one drops them all.
pub fn apply_choices(samples: &mut Vec<Sample>, choices: &[SampleChoice]) {
    samples.retain(|sample| {
        let text = sample.text();
        choices
            .iter()
            .find(|choice| choice.codepoints == text)
            .is_none_or(|choice| choice.line == Some(sample.line))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text_bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(text_bytes)
    }

    #[test]
    fn decodes_a_plain_identifier() {
        let id = format!("char_L2_P3_x378_y1471_x766_y1734_{}", encode("E".as_bytes()));
        let decoded = decode_identifier(&id).expect("valid identifier");
        assert_eq!(decoded.line, 2);
        assert_eq!(decoded.position, 3);
        assert_eq!(
            decoded.bbox,
            PixelBox {
                x0: 378,
                y0: 1471,
                x1: 766,
                y1: 1734
            }
        );
        assert_eq!(decoded.codepoints, vec!['E']);
    }

    #[test]
    fn merges_encoded_surrogate_pairs() {
        // U+1F600 as CESU-8: D83D DE00
        let bytes = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80, b'x'];
        let id = format!("char_L0_P0_x0_y0_x1_y1_{}", encode(&bytes));
        let decoded = decode_identifier(&id).expect("surrogate pair should merge");
        assert_eq!(decoded.codepoints, vec!['\u{1F600}', 'x']);
    }

    #[test]
    fn lone_low_surrogate_is_an_error() {
        let bytes = [b'a', 0xED, 0xB8, 0x80];
        let id = format!("char_L0_P0_x0_y0_x1_y1_{}", encode(&bytes));
        let err = decode_identifier(&id).expect_err("lone low surrogate");
        assert!(matches!(err, DecodeError::UnpairedSurrogate { unit: 0xDE00, .. }));
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        for id in [
            "glyph_L0_P0_x0_y0_x1_y1_RQ==",
            "char_L0_P0_x0_y0_x1_RQ==",
            "char_Lzero_P0_x0_y0_x1_y1_RQ==",
            "char_L0_P0_x0_y0_x1_y1_",
            "char_L0_P0_x0_y0_x1_y1_!!!",
        ] {
            assert!(decode_identifier(id).is_err(), "{id} should not decode");
        }
    }

    #[test]
    fn sample_kinds_and_names() {
        let sample = |text: &str| Sample {
            line: 0,
            position: Some(0),
            bbox: PixelBox {
                x0: 0,
                y0: 0,
                x1: 10,
                y1: 10,
            },
            codepoints: text.chars().collect(),
            outline_ref: PathBuf::from("x.svg"),
        };
        assert_eq!(sample("T").kind(), SampleKind::Single('T'));
        assert_eq!(sample("T").glyph_name(), "T");
        assert_eq!(sample("TT").kind(), SampleKind::Ligature);
        assert_eq!(sample("TT").glyph_name(), "T_T");
        assert_eq!(
            sample("U.ss01").kind(),
            SampleKind::Variant {
                base: 'U',
                suffix: "ss01".to_string()
            }
        );
        assert_eq!(sample("U.ss01").glyph_name(), "U.ss01");
        assert_eq!(sample("..").kind(), SampleKind::Ligature);
    }

    #[test]
    fn directory_decoding_sorts_by_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        for text in ["B", "A"] {
            let file = format!("char_L0_P0_x0_y0_x1_y1_{}.svg", encode(text.as_bytes()));
            fs::write(dir.path().join(file), "<svg/>").expect("write sample");
        }
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write");

        let samples = decode_directory(dir.path()).expect("decode");
        assert_eq!(samples.len(), 2);
        let mut sorted = samples.iter().map(|s| s.outline_ref.clone()).collect::<Vec<_>>();
        sorted.sort();
        assert_eq!(
            samples.iter().map(|s| s.outline_ref.clone()).collect::<Vec<_>>(),
            sorted
        );
    }

    #[test]
    fn aliases_and_choices() {
        let make = |text: &str, line| Sample {
            line,
            position: Some(1),
            bbox: PixelBox {
                x0: 0,
                y0: 0,
                x1: 10,
                y1: 10,
            },
            codepoints: text.chars().collect(),
            outline_ref: PathBuf::from(format!("{text}{line}.svg")),
        };
        let mut samples = vec![make("I", 3), make("I", 4), make("as", 1)];
        apply_aliases(
            &mut samples,
            &[SampleAlias {
                source: "I".into(),
                line: Some(4),
                target: "|".into(),
            }],
        );
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[3].text(), "|");
        assert_eq!(samples[3].position, None);

        apply_choices(
            &mut samples,
            &[
                SampleChoice {
                    codepoints: "I".into(),
                    line: Some(4),
                },
                SampleChoice {
                    codepoints: "as".into(),
                    line: None,
                },
            ],
        );
        let texts: Vec<_> = samples.iter().map(|s| (s.text(), s.line)).collect();
        assert_eq!(texts, vec![("I".to_string(), 4), ("|".to_string(), 4)]);
    }
}
