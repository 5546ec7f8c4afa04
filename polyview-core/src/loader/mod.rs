//! Mesh file loading.
//!
//! Two whitespace-separated text formats are supported:
//!
//! | Format | Tag   | Extension | Layout                                  |
//! |--------|-------|-----------|-----------------------------------------|
//! | Indexed | `OFF` | `.off`   | `V F E`, V × `x y z`, F × `3 a b c`     |
//! | Triangle soup | `RAW` | `.raw` | `T`, T × nine corner coordinates |
//!
//! Lines before the tag line are ignored, as is anything after the tag on
//! the tag line itself.

pub mod off;
pub mod raw;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use nom::{
    bytes::complete::tag,
    character::complete::{i64 as int, line_ending, multispace0, not_line_ending},
    combinator::opt,
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::{IntegrityWarning, LoadError, Result};
use crate::geometry::Mesh;
use crate::weld::WeldStrategy;

/// Supported mesh text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Indexed polygon format, tag `OFF`.
    Off,
    /// Unindexed triangle soup, tag `RAW`.
    Raw,
}

impl MeshFormat {
    /// Three-character tag that opens the data section.
    pub fn tag(self) -> &'static str {
        match self {
            MeshFormat::Off => "OFF",
            MeshFormat::Raw => "RAW",
        }
    }

    pub fn from_extension(ext: &str) -> Option<MeshFormat> {
        match ext.to_ascii_lowercase().as_str() {
            "off" => Some(MeshFormat::Off),
            "raw" => Some(MeshFormat::Raw),
            _ => None,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<MeshFormat> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(MeshFormat::from_extension)
    }

    /// Guess the format from the first line carrying a known tag.
    pub fn sniff(source: &str) -> Option<MeshFormat> {
        source.lines().find_map(|line| {
            [MeshFormat::Off, MeshFormat::Raw]
                .into_iter()
                .find(|format| line.starts_with(format.tag()))
        })
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for MeshFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MeshFormat::from_extension(s).ok_or_else(|| format!("unknown mesh format '{s}'"))
    }
}

/// A successfully loaded mesh and the non-fatal problems met on the way.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub mesh: Mesh,
    pub format: MeshFormat,
    pub warnings: Vec<IntegrityWarning>,
}

/// Load a mesh file.
///
/// The format is `format` when given, otherwise the file extension, otherwise
/// whichever tag appears first in the file.
pub fn load<P: AsRef<Path>>(
    path: P,
    format: Option<MeshFormat>,
    weld: WeldStrategy,
) -> Result<Loaded> {
    let path = path.as_ref();
    let source = read_source(path)?;
    let format = format
        .or_else(|| MeshFormat::from_path(path))
        .or_else(|| MeshFormat::sniff(&source))
        .ok_or_else(|| {
            LoadError::format(
                MeshFormat::Off,
                1,
                format!("cannot determine mesh format of {}", path.display()),
            )
        })?;

    tracing::debug!("Loading {} as {}", path.display(), format);
    parse(&source, format, weld)
}

/// Parse in-memory text of a known format.
pub fn parse(source: &str, format: MeshFormat, weld: WeldStrategy) -> Result<Loaded> {
    match format {
        MeshFormat::Off => off::parse(source),
        MeshFormat::Raw => raw::parse(source, weld),
    }
}

pub(crate) fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn tag_line<'a>(tag_str: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(preceded(tag(tag_str), not_line_ending), opt(line_ending))
}

fn any_line(input: &str) -> IResult<&str, &str> {
    terminated(not_line_ending, line_ending)(input)
}

/// Token reader over a text source that can report line numbers.
pub(crate) struct TextCursor<'a> {
    rest: &'a str,
    /// Newlines consumed so far.
    newlines: usize,
    format: MeshFormat,
}

impl<'a> TextCursor<'a> {
    pub(crate) fn new(source: &'a str, format: MeshFormat) -> Self {
        Self {
            rest: source,
            newlines: 0,
            format,
        }
    }

    /// 1-based line of the current read position.
    pub(crate) fn line(&self) -> usize {
        self.newlines + 1
    }

    /// Move the read position to `rest`, a suffix of the current input.
    fn advance(&mut self, rest: &'a str) {
        let consumed = &self.rest[..self.rest.len() - rest.len()];
        self.newlines += consumed.bytes().filter(|&b| b == b'\n').count();
        self.rest = rest;
    }

    fn error(&self, message: impl Into<String>) -> LoadError {
        LoadError::format(self.format, self.line(), message)
    }

    /// Consume lines up to and including the first one starting with the
    /// format tag.
    pub(crate) fn skip_to_tag(&mut self) -> Result<()> {
        let tag_str = self.format.tag();
        loop {
            if self.rest.is_empty() {
                return Err(self.error(format!("no '{tag_str}' tag found")));
            }
            if let Ok((rest, _)) = tag_line(tag_str)(self.rest) {
                self.advance(rest);
                return Ok(());
            }
            match any_line(self.rest) {
                Ok((rest, _)) => self.advance(rest),
                Err(_) => {
                    // Final line without a newline that is not the tag.
                    let rest = self.rest;
                    self.advance(&rest[rest.len()..]);
                }
            }
        }
    }

    fn skip_space(&mut self) {
        let parsed: IResult<&str, &str> = multispace0(self.rest);
        if let Ok((rest, _)) = parsed {
            self.advance(rest);
        }
    }

    fn describe_next(&self) -> String {
        match self.rest.split_whitespace().next() {
            Some(token) => format!("'{token}'"),
            None => "end of input".to_string(),
        }
    }

    pub(crate) fn float(&mut self, what: &str) -> Result<f32> {
        self.skip_space();
        let parsed: IResult<&str, f32> = float(self.rest);
        match parsed {
            Ok((rest, value)) => {
                self.advance(rest);
                Ok(value)
            }
            Err(_) => Err(self.error(format!("expected {what}, found {}", self.describe_next()))),
        }
    }

    pub(crate) fn int(&mut self, what: &str) -> Result<i64> {
        self.skip_space();
        let parsed: IResult<&str, i64> = int(self.rest);
        match parsed {
            Ok((rest, value)) => {
                self.advance(rest);
                Ok(value)
            }
            Err(_) => Err(self.error(format!("expected {what}, found {}", self.describe_next()))),
        }
    }

    /// A non-negative integer count.
    pub(crate) fn count(&mut self, what: &str) -> Result<usize> {
        self.skip_space();
        let line = self.line();
        let value = self.int(what)?;
        usize::try_from(value).map_err(|_| {
            LoadError::format(
                self.format,
                line,
                format!("{what} must not be negative, got {value}"),
            )
        })
    }

    /// Three floats as a point.
    pub(crate) fn point(&mut self, what: &str) -> Result<nalgebra::Point3<f32>> {
        let x = self.float(what)?;
        let y = self.float(what)?;
        let z = self.float(what)?;
        Ok(nalgebra::Point3::new(x, y, z))
    }

    /// Capacity hint that cannot exceed what the remaining text could hold.
    pub(crate) fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.rest.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const OFF_TEXT: &str = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
    const RAW_TEXT: &str = "RAW\n1\n0 0 0 1 0 0 0 1 0\n";

    fn write_temp(suffix: &str, text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(MeshFormat::from_path("a/b/mesh.OFF"), Some(MeshFormat::Off));
        assert_eq!(MeshFormat::from_path("scene.raw"), Some(MeshFormat::Raw));
        assert_eq!(MeshFormat::from_path("model.stl"), None);
        assert_eq!("raw".parse::<MeshFormat>(), Ok(MeshFormat::Raw));
    }

    #[test]
    fn test_sniff() {
        assert_eq!(MeshFormat::sniff("# comment\nRAW\n0\n"), Some(MeshFormat::Raw));
        assert_eq!(MeshFormat::sniff(OFF_TEXT), Some(MeshFormat::Off));
        assert_eq!(MeshFormat::sniff("nothing here"), None);
    }

    #[test]
    fn test_load_by_extension() {
        let file = write_temp(".off", OFF_TEXT);
        let loaded = load(file.path(), None, WeldStrategy::Linear).unwrap();
        assert_eq!(loaded.format, MeshFormat::Off);
        assert_eq!(loaded.mesh.faces().len(), 1);

        let file = write_temp(".raw", RAW_TEXT);
        let loaded = load(file.path(), None, WeldStrategy::Grid).unwrap();
        assert_eq!(loaded.format, MeshFormat::Raw);
        assert_eq!(loaded.mesh.vertices().len(), 3);
    }

    #[test]
    fn test_load_sniffs_unknown_extension() {
        let file = write_temp(".txt", RAW_TEXT);
        let loaded = load(file.path(), None, WeldStrategy::Linear).unwrap();
        assert_eq!(loaded.format, MeshFormat::Raw);
    }

    #[test]
    fn test_explicit_format_wins() {
        let file = write_temp(".raw", OFF_TEXT);
        let loaded = load(file.path(), Some(MeshFormat::Off), WeldStrategy::Linear).unwrap();
        assert_eq!(loaded.format, MeshFormat::Off);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("absent.off"), None, WeldStrategy::Linear).unwrap_err();
        assert!(err.is_read());
    }

    #[test]
    fn test_undetectable_format() {
        let file = write_temp(".bin", "hello\n");
        let err = load(file.path(), None, WeldStrategy::Linear).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_cursor_line_numbers() {
        let mut cursor = TextCursor::new("junk\nOFF\n1 2\n  x", MeshFormat::Off);
        cursor.skip_to_tag().unwrap();
        assert_eq!(cursor.line(), 3);
        assert_eq!(cursor.int("a").unwrap(), 1);
        assert_eq!(cursor.int("b").unwrap(), 2);
        match cursor.float("c").unwrap_err() {
            LoadError::Format { line, message, .. } => {
                assert_eq!(line, 4);
                assert!(message.contains("'x'"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_line_count_survives_blank_lines() {
        let mut cursor = TextCursor::new("OFF\n\n\n7\r\n\n  8", MeshFormat::Off);
        cursor.skip_to_tag().unwrap();
        assert_eq!(cursor.int("a").unwrap(), 7);
        assert_eq!(cursor.line(), 4);
        assert_eq!(cursor.int("b").unwrap(), 8);
        assert_eq!(cursor.line(), 6);
    }

    #[test]
    fn test_tag_at_end_without_newline() {
        let mut cursor = TextCursor::new("header\nOFF", MeshFormat::Off);
        cursor.skip_to_tag().unwrap();
        assert!(cursor.int("count").is_err());
    }
}
