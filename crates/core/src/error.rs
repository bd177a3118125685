//! Error type shared by every stage of case generation
//!
//! Each variant carries enough context (path, offending value, cause) to be
//! shown to the user as a single line. Unmapped land-use codes are not an
//! error: they resolve through the scheme fallback and are only counted in
//! [`crate::fuel::ClassificationReport`].

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while building an FDS case
#[derive(Debug)]
pub enum CaseError {
    /// No valid projected zone can be derived, or a coordinate is degenerate
    Coordinate {
        /// What went wrong, including the offending value
        message: String,
    },
    /// Mesh arrays are inconsistent or reference missing entities
    Encoding {
        /// What went wrong, including the offending index or id
        message: String,
    },
    /// Wind ramp file (or another input file) is unreadable or malformed
    Import {
        /// File being read
        path: PathBuf,
        /// Underlying cause
        cause: String,
    },
    /// Destination file could not be written
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
}

impl CaseError {
    pub(crate) fn coordinate(message: impl Into<String>) -> Self {
        CaseError::Coordinate {
            message: message.into(),
        }
    }

    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        CaseError::Encoding {
            message: message.into(),
        }
    }

    pub(crate) fn import(path: &Path, cause: impl ToString) -> Self {
        CaseError::Import {
            path: path.to_path_buf(),
            cause: cause.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        CaseError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl std::fmt::Display for CaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseError::Coordinate { message } => write!(f, "Coordinate error: {message}"),
            CaseError::Encoding { message } => write!(f, "Terrain encoding error: {message}"),
            CaseError::Import { path, cause } => {
                write!(f, "Cannot import <{}>: {cause}", path.display())
            }
            CaseError::Write { path, source } => {
                write!(f, "File not writable to <{}>: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CaseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaseError::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias used across the crate
pub type CaseResult<T> = Result<T, CaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_single_line() {
        let errors = [
            CaseError::coordinate("Latitude <91> out of bounds"),
            CaseError::encoding("face 3 references vertex 12, only 9 vertices"),
            CaseError::import(Path::new("wind.csv"), "line 2: expected 3 columns"),
            CaseError::write(
                Path::new("/nope/case.fds"),
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            ),
        ];

        for err in &errors {
            let msg = err.to_string();
            assert!(!msg.contains('\n'), "multi-line message: {msg}");
        }
    }

    #[test]
    fn test_import_error_names_path() {
        let err = CaseError::import(Path::new("data/wind.csv"), "missing header");
        let msg = err.to_string();
        assert!(msg.contains("data/wind.csv"));
        assert!(msg.contains("missing header"));
    }

    #[test]
    fn test_write_error_exposes_source() {
        use std::error::Error;

        let err = CaseError::write(
            Path::new("out.bingeom"),
            io::Error::new(io::ErrorKind::NotFound, "no such dir"),
        );
        assert!(err.source().is_some());
    }
}
