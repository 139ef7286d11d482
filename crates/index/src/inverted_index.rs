use crate::query_result::QueryResult;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::ops::Bound;

/// Positions of one word inside one document, ascending and unique.
pub type Postings = BTreeSet<usize>;

/// Documents containing one word, keyed by identifier in ascending order.
pub type DocumentPostings = BTreeMap<String, Postings>;

/// Word -> document -> positions, with every level kept in ascending order.
///
/// This type does no locking of its own. Producers build one per unit of work
/// and publish it with [`InvertedIndex::merge`]; shared access goes through
/// [`crate::SynchronizedIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    words: BTreeMap<String, DocumentPostings>,
}

impl InvertedIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `word` at `position` inside `document`.
    ///
    /// Returns `false` when that exact posting was already present.
    pub fn add(&mut self, word: &str, document: &str, position: usize) -> bool {
        self.words
            .entry(word.to_owned())
            .or_default()
            .entry(document.to_owned())
            .or_default()
            .insert(position)
    }

    /// Adds `words` at consecutive positions starting from `start`.
    ///
    /// Returns the position following the last word so line-by-line readers can
    /// keep numbering across calls. Tokens are expected to be cleaned and
    /// non-empty.
    pub fn add_all<S: AsRef<str>>(&mut self, words: &[S], document: &str, start: usize) -> usize {
        let mut position = start;
        for word in words {
            self.add(word.as_ref(), document, position);
            position += 1;
        }
        position
    }

    /// Absorbs every posting of `other`.
    ///
    /// Substructures present only in `other` are moved rather than copied;
    /// postings for a word/document pair present in both are unioned.
    pub fn merge(&mut self, other: InvertedIndex) {
        if self.words.is_empty() {
            self.words = other.words;
            return;
        }

        for (word, documents) in other.words {
            match self.words.entry(word) {
                Entry::Vacant(slot) => {
                    slot.insert(documents);
                }
                Entry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    for (document, positions) in documents {
                        match existing.entry(document) {
                            Entry::Vacant(doc_slot) => {
                                doc_slot.insert(positions);
                            }
                            Entry::Occupied(mut doc_slot) => {
                                doc_slot.get_mut().extend(positions);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Ranks documents containing any word that starts with one of `terms`.
    ///
    /// Each matching (word, document) pair contributes its posting count and
    /// its earliest position to that document's [`QueryResult`]. Empty terms
    /// match nothing. The result is sorted best match first.
    #[must_use]
    pub fn prefix_search<S: AsRef<str>>(&self, terms: &[S]) -> Vec<QueryResult> {
        let mut matches: HashMap<&str, QueryResult> = HashMap::new();

        for term in terms {
            let term = term.as_ref();
            if term.is_empty() {
                continue;
            }

            let candidates = self
                .words
                .range::<str, _>((Bound::Included(term), Bound::Unbounded))
                .take_while(|(word, _)| word.starts_with(term));

            for (_, documents) in candidates {
                for (document, positions) in documents {
                    let Some(&first) = positions.first() else {
                        continue;
                    };
                    matches
                        .entry(document.as_str())
                        .and_modify(|result| result.absorb(positions.len(), first))
                        .or_insert_with(|| QueryResult::new(document.as_str(), positions.len(), first));
                }
            }
        }

        let mut results: Vec<QueryResult> = matches.into_values().collect();
        results.sort();
        results
    }

    /// Total number of positions recorded for `word` across all documents.
    #[must_use]
    pub fn word_count(&self, word: &str) -> usize {
        self.words
            .get(word)
            .map_or(0, |documents| documents.values().map(BTreeSet::len).sum())
    }

    /// Number of distinct documents containing `word`.
    #[must_use]
    pub fn document_count(&self, word: &str) -> usize {
        self.words.get(word).map_or(0, BTreeMap::len)
    }

    /// Number of distinct words in the index.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn postings(&self, word: &str, document: &str) -> Option<&Postings> {
        self.words.get(word)?.get(document)
    }

    /// Earliest position of `word` in `document`.
    #[must_use]
    pub fn first_position(&self, word: &str, document: &str) -> Option<usize> {
        self.postings(word, document)?.first().copied()
    }
}

impl fmt::Display for InvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.words)
    }
}
