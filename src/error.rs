//! Error types
//!
//! Only [`LoadError`] ever reaches a caller, and only from construction.
//! Everything after that degrades output instead of failing.

use std::path::PathBuf;

/// Failure while loading grammar, theme or config definitions
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no grammar or theme definitions found in {0}")]
    Missing(PathBuf),

    #[error("malformed definition {file}: {reason}")]
    Malformed { file: PathBuf, reason: String },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub(crate) fn malformed(file: impl Into<PathBuf>, reason: impl ToString) -> Self {
        LoadError::Malformed {
            file: file.into(),
            reason: reason.to_string(),
        }
    }
}

/// Lexer trouble on a single line. Logged, never returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("parse failed: {reason}")]
    Parse { reason: String },

    #[error("scope stack out of sync: {reason}")]
    Scope { reason: String },

    #[error("line of {len} bytes truncated to {limit}")]
    LineTooLong { len: usize, limit: usize },
}

/// A highlight request that had to be clamped to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "requested lines {start}..{requested_end} clamped to {start}..{clamped_end} ({available} lines available)"
)]
pub struct BoundsWarning {
    pub start: usize,
    pub requested_end: usize,
    pub clamped_end: usize,
    pub available: usize,
}
