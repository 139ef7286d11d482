//! # Sift Index
//!
//! In-memory inverted index with prefix search, plus the locking wrapper that
//! lets many threads build and query it at once.
//!
//! ## Layout
//!
//! ```text
//! word ──> document ──> positions
//!  (ascending)  (ascending)  (ascending, unique)
//! ```
//!
//! ## Example
//!
//! ```
//! use sift_index::{text, InvertedIndex, SynchronizedIndex};
//!
//! let mut local = InvertedIndex::new();
//! local.add_all(&text::split("The Cat sat. The cat RAN."), "notes.txt", 1);
//!
//! let shared = SynchronizedIndex::new();
//! shared.merge(local);
//!
//! let results = shared.prefix_search(&["ca"]);
//! assert_eq!(results[0].count(), 2);
//! assert_eq!(results[0].first_position(), 2);
//! ```

mod inverted_index;
mod query_result;
mod shared_lock;
mod synchronized;
pub mod text;

pub use inverted_index::{DocumentPostings, InvertedIndex, Postings};
pub use query_result::QueryResult;
pub use shared_lock::{ExclusiveGuard, SharedGuard, SharedLock};
pub use synchronized::SynchronizedIndex;
