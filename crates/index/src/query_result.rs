use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// One document's aggregated match for a multi-term prefix query.
///
/// Ordering ranks the best match first: more matches, then an earlier first
/// match, then the document identifier. Two results only compare equal when
/// all three fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryResult {
    #[serde(rename = "where")]
    document: String,
    count: usize,
    #[serde(rename = "index")]
    first_position: usize,
}

impl QueryResult {
    #[must_use]
    pub fn new(document: impl Into<String>, count: usize, first_position: usize) -> Self {
        Self {
            document: document.into(),
            count,
            first_position,
        }
    }

    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn first_position(&self) -> usize {
        self.first_position
    }

    /// Folds another match for the same document into this one.
    pub fn absorb(&mut self, count: usize, position: usize) {
        self.count += count;
        self.first_position = self.first_position.min(position);
    }
}

impl Ord for QueryResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.first_position.cmp(&other.first_position))
            .then_with(|| self.document.cmp(&other.document))
    }
}

impl PartialOrd for QueryResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.document, self.count, self.first_position)
    }
}
