use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced by the filter pipeline and the extent reporter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The source or sink could not be opened, read, or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record could not be parsed by a predicate that must inspect it.
    /// `line` is the 1-based line number in the source file.
    #[error("malformed record at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

impl FilterError {
    pub(crate) fn io(path: &Path, source: io::Error) -> FilterError {
        FilterError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, reason: impl Into<String>) -> FilterError {
        FilterError::Parse {
            line,
            reason: reason.into(),
        }
    }
}
