use std::{io, path::PathBuf};

/// Errors surfaced by dictionary loading, code table loading and queries.
///
/// A missing dictionary file is not an error: it is logged and yields an
/// empty dictionary. Length mismatches during fine scoring are plain
/// non-matches.
#[derive(Debug, thiserror::Error)]
pub enum SscError {
    #[error("file {path:?} has an invalid line {line_no}: {line:?}")]
    Format {
        path: PathBuf,
        line_no: usize,
        line: String,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse code tables {path:?}: {source}")]
    CodeTable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot determine the config directory")]
    NoConfigDir,

    #[error("business [{0}] has no alias entries")]
    DomainNotFound(String),

    #[error("failed to encode {0:?} into sound-shape codes")]
    Encoding(String),
}

pub type Result<T> = std::result::Result<T, SscError>;
