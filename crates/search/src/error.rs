use sift_indexer::IndexerError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read queries from {}: {source}", path.display())]
    ReadQueries {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Indexer error: {0}")]
    Indexer(#[from] IndexerError),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}
