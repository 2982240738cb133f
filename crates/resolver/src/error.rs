use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot open deps file {path}: {source}")]
    CatalogOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record in deps file {path} at line {line}")]
    MalformedRecord { path: PathBuf, line: usize },
}

pub type Result<T> = std::result::Result<T, ResolverError>;
