use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the dump stream itself. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("malformed XML in dump {path}: {message}")]
    Format { path: PathBuf, message: String },

    #[error("failed to read dump {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One page's wikitext failed to parse into a node tree. Recovered per page:
/// the page contributes zero aliases and the stream continues.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("markup nesting exceeds the depth limit of {limit}")]
    TooDeep { limit: usize },
}

/// Invalid run configuration, rejected before any page is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the set of requested alias types must not be empty")]
    EmptyTypeSet,
}
