//! Error types for mesh loading.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::loader::MeshFormat;

/// Result type alias using [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;

/// Errors that abort a mesh load. No partial mesh is produced.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A tag, header or numeric field is missing or malformed.
    #[error("malformed {format} data at line {line}: {message}")]
    Format {
        format: MeshFormat,
        /// 1-based line where the problem was detected.
        line: usize,
        message: String,
    },
}

impl LoadError {
    pub(crate) fn format(format: MeshFormat, line: usize, message: impl Into<String>) -> Self {
        LoadError::Format {
            format,
            line,
            message: message.into(),
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, LoadError::Read { .. })
    }

    pub fn is_format(&self) -> bool {
        matches!(self, LoadError::Format { .. })
    }
}

/// Non-fatal data problem found while loading an indexed mesh.
///
/// The face was still built from the three indices present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityWarning {
    pub face: usize,
    pub line: usize,
    /// Vertex count declared by the face record (expected 3).
    pub declared: i64,
}

impl fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "face {} at line {} declares {} vertices, expected 3",
            self.face, self.line, self.declared
        )
    }
}
