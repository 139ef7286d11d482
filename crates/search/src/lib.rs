//! # Sift Search
//!
//! Prefix-query processing over a [`sift_index::SynchronizedIndex`].
//!
//! Both processors produce a [`QueryTable`] ordered by submission. The
//! concurrent one reserves each line's slot before queueing its search and
//! fills the slot when the search completes.
//!
//! ```
//! use sift_index::{text, InvertedIndex, SynchronizedIndex};
//! use sift_search::{QueryProcessor, SequentialQueryProcessor};
//! use std::sync::Arc;
//!
//! let mut local = InvertedIndex::new();
//! local.add_all(&text::split("cats chase mice"), "notes.txt", 1);
//!
//! let mut processor = SequentialQueryProcessor::new(Arc::new(SynchronizedIndex::from(local)));
//! processor.parse_line("cat");
//! assert_eq!(processor.results("cat").map(|found| found.len()), Some(1));
//! ```

mod error;
mod processor;
mod table;

pub use error::{Result, SearchError};
pub use processor::{ConcurrentQueryProcessor, QueryProcessor, SequentialQueryProcessor};
pub use table::QueryTable;
