use std::path::PathBuf;

use thiserror::Error;

/// Failures of the library API itself.
///
/// Problems in the compiled program are not `CoreError`s: they are
/// collected as [`crate::diagnostic::Diagnostic`]s.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to read source {}: {source}", path.display())]
    SourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} error(s) encountered")]
    UnresolvedErrors(usize),
    #[error("internal error: {0}")]
    Internal(String),
}
