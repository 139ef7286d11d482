//! # Sift Indexer
//!
//! Builders that fill an inverted index from local text files or a web crawl.
//!
//! ## Pipeline
//!
//! ```text
//! Directory                         Seed URL
//!     │                                 │
//!     ├──> walkdir (.txt / .text)       ├──> Frontier (bounded, deduplicated)
//!     │      └─> one task per file      │      └─> one task per page
//!     │                                 │
//!     └──> WorkQueue ──> local index ───┴──> merge into SynchronizedIndex
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use sift_index::SynchronizedIndex;
//! use sift_indexer::DirectoryIndexer;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> sift_indexer::Result<()> {
//!     let index = Arc::new(SynchronizedIndex::new());
//!     let indexer = DirectoryIndexer::new(Arc::clone(&index), 4)?;
//!     indexer.traverse(Path::new("/path/to/texts"))?;
//!     indexer.close();
//!
//!     println!("{} distinct words", index.vocabulary_size());
//!     Ok(())
//! }
//! ```

pub mod crawler;
mod directory;
mod error;
mod work_queue;

pub use crawler::{Crawler, CrawlerConfig, Frontier};
pub use directory::{
    index_directory, index_file, is_text_file, text_files, DirectoryIndexer,
    DEFAULT_TEXT_EXTENSIONS,
};
pub use error::{IndexerError, Result};
pub use work_queue::{thread_count, Submitter, Task, WorkQueue, DEFAULT_THREADS};
