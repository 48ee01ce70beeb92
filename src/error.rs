use std::path::PathBuf;

use thiserror::Error;

/// Failure to load or compile a declarative schema file.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },

    #[error("unknown leaf type '{0}'")]
    UnknownType(String),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("union must list at least one alternative")]
    EmptyUnion,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
