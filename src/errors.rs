//! Error types for the generator
//!
//! Two layers, mirroring the two failure modes of the tool:
//!
//! - [`ParseError`] is produced by the text-scanning layer and carries a
//!   snippet of the offending source so the user can locate it. It knows
//!   nothing about files.
//! - [`Error`] is the top-level error returned from the run. It attaches
//!   the file path to parse failures and adds the configuration-level
//!   failures (duplicate definitions, unresolved registrations, missing
//!   output marker, I/O).
//!
//! All variants of [`Error`] are fatal: the run aborts before the output
//! file is touched, so a failed run never leaves a half-written generated
//! region behind.

use std::path::PathBuf;
use thiserror::Error;

/// How much of the offending text a [`ParseError`] keeps for context.
const SNIPPET_LEN: usize = 60;

/// A failure while scanning or decomposing source text.
#[derive(Debug, Clone, Error)]
#[error("{message} near '{context}'")]
pub struct ParseError {
    pub message: String,
    pub context: String,
}

impl ParseError {
    /// Build a parse error, truncating `near` to a short context snippet.
    pub fn new(message: impl Into<String>, near: &str) -> Self {
        let trimmed = near.trim();
        let context: String = trimmed.chars().take(SNIPPET_LEN).collect();
        Self {
            message: message.into(),
            context,
        }
    }
}

/// Top-level error for a generator run.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input in one of the scanned files.
    #[error("{}: {source}", .file.display())]
    Parse {
        file: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The same struct type name was defined in two scanned files. The
    /// generator cannot know which definition a registration refers to.
    #[error("struct type '{name}' is defined in both {} and {}", .first.display(), .second.display())]
    DuplicateDefinition {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A REGISTER_STRUCT invocation names a type that was never defined in
    /// any scanned file. Usually a stale or misspelled marker.
    #[error("REGISTER_STRUCT({type_name}, {instance_name}) does not match any struct definition")]
    UnresolvedRegistration {
        type_name: String,
        instance_name: String,
    },

    /// A REGISTER_STRUCT invocation resolved to a union definition. The
    /// runtime macro layer only accepts structs as registration roots.
    #[error("REGISTER_STRUCT({type_name}, {instance_name}) resolves to a union; only structs can be registered")]
    UnionRegistration {
        type_name: String,
        instance_name: String,
    },

    /// The output file does not contain the generated-region marker.
    #[error("{}: generated-region marker '{marker}' not found", .file.display())]
    MissingMarker { file: PathBuf, marker: String },

    /// Filesystem failure while reading sources or writing the output.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Attach a file path to a scan-layer failure.
    pub fn parse(file: impl Into<PathBuf>, source: ParseError) -> Self {
        Error::Parse {
            file: file.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_truncation() {
        let long = "x".repeat(200);
        let err = ParseError::new("bad member", &long);
        assert_eq!(err.context.len(), SNIPPET_LEN);
    }

    #[test]
    fn test_snippet_trims_whitespace() {
        let err = ParseError::new("bad member", "   int a ;   ");
        assert_eq!(err.context, "int a ;");
    }
}
