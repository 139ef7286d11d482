use crate::inverted_index::InvertedIndex;
use crate::query_result::QueryResult;
use crate::shared_lock::SharedLock;
use std::fmt;

/// [`InvertedIndex`] shared between producer and consumer threads.
///
/// Mutations hold exclusive access for the whole call; searches, statistics,
/// export and formatting hold shared access. None of the methods may be
/// called from inside [`SynchronizedIndex::read_with`], the lock is not
/// re-entrant.
#[derive(Debug, Default)]
pub struct SynchronizedIndex {
    inner: SharedLock<InvertedIndex>,
}

impl SynchronizedIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, word: &str, document: &str, position: usize) -> bool {
        self.inner.write().add(word, document, position)
    }

    pub fn add_all<S: AsRef<str>>(&self, words: &[S], document: &str, start: usize) -> usize {
        self.inner.write().add_all(words, document, start)
    }

    /// Publishes a worker-local index with a single exclusive acquisition.
    pub fn merge(&self, local: InvertedIndex) {
        let words = local.vocabulary_size();
        self.inner.write().merge(local);
        log::trace!("merged {words} words into shared index");
    }

    #[must_use]
    pub fn prefix_search<S: AsRef<str>>(&self, terms: &[S]) -> Vec<QueryResult> {
        self.inner.read().prefix_search(terms)
    }

    #[must_use]
    pub fn word_count(&self, word: &str) -> usize {
        self.inner.read().word_count(word)
    }

    #[must_use]
    pub fn document_count(&self, word: &str) -> usize {
        self.inner.read().document_count(word)
    }

    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.inner.read().vocabulary_size()
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.inner.read().contains(word)
    }

    /// Runs `f` against the index under shared access, e.g. to serialize it.
    pub fn read_with<R>(&self, f: impl FnOnce(&InvertedIndex) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Copies the current content out under shared access.
    #[must_use]
    pub fn snapshot(&self) -> InvertedIndex {
        self.inner.read().clone()
    }
}

impl From<InvertedIndex> for SynchronizedIndex {
    fn from(index: InvertedIndex) -> Self {
        Self {
            inner: SharedLock::new(index),
        }
    }
}

impl fmt::Display for SynchronizedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.read();
        fmt::Display::fmt(&*guard, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn wrapper_delegates_to_index() {
        let index = SynchronizedIndex::new();
        assert!(index.add("cat", "a", 1));
        assert_eq!(index.add_all(&["cat", "dog"], "b", 1), 3);

        assert_eq!(index.word_count("cat"), 2);
        assert_eq!(index.document_count("cat"), 2);
        assert_eq!(index.vocabulary_size(), 2);
        assert!(index.contains("dog"));
        assert_eq!(index.prefix_search(&["d"]), vec![QueryResult::new("b", 1, 2)]);
    }

    #[test]
    fn read_with_sees_merged_content() {
        let index = SynchronizedIndex::new();
        let mut local = InvertedIndex::new();
        local.add("sun", "x", 4);
        index.merge(local);

        let total = index.read_with(|inner| inner.word_count("sun"));
        assert_eq!(total, 1);
        assert_eq!(index.snapshot().first_position("sun", "x"), Some(4));
        assert!(index.to_string().contains("sun"));
    }

    #[test]
    fn concurrent_merges_lose_nothing() {
        let index = Arc::new(SynchronizedIndex::new());

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    let document = format!("doc-{worker}");
                    for round in 0..50 {
                        let mut local = InvertedIndex::new();
                        local.add("shared", &document, round + 1);
                        local.add(&format!("w{worker}r{round}"), &document, 1);
                        index.merge(local);
                        let _ = index.prefix_search(&["sha"]);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(index.word_count("shared"), 400);
        assert_eq!(index.document_count("shared"), 8);
        assert_eq!(index.vocabulary_size(), 401);
    }
}
