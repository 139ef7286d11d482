use serde::ser::{Serialize, SerializeMap, Serializer};
use sift_index::QueryResult;
use std::collections::HashMap;

/// Query line to ranked results, iterated in the order lines were first
/// reserved rather than the order their searches finished.
///
/// A reserved line without results yet is *pending*. Pending entries read as
/// empty result lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryTable {
    entries: Vec<(String, Option<Vec<QueryResult>>)>,
    slots: HashMap<String, usize>,
}

impl QueryTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the next position for `line`. Returns `false` if the line
    /// already has a position; it keeps it along with any results.
    pub fn reserve(&mut self, line: &str) -> bool {
        if self.slots.contains_key(line) {
            return false;
        }
        self.slots.insert(line.to_string(), self.entries.len());
        self.entries.push((line.to_string(), None));
        true
    }

    /// Stores `results` for `line`, replacing a placeholder or earlier
    /// results. An unreserved line is appended.
    pub fn fill(&mut self, line: &str, results: Vec<QueryResult>) {
        self.reserve(line);
        if let Some(&slot) = self.slots.get(line) {
            self.entries[slot].1 = Some(results);
        }
    }

    /// Results for `line`, or `None` while it is pending or absent.
    #[must_use]
    pub fn get(&self, line: &str) -> Option<&[QueryResult]> {
        let &slot = self.slots.get(line)?;
        self.entries[slot].1.as_deref()
    }

    #[must_use]
    pub fn is_pending(&self, line: &str) -> bool {
        self.slots
            .get(line)
            .is_some_and(|&slot| self.entries[slot].1.is_none())
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, results)| results.is_none())
            .count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines in reservation order with their results.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[QueryResult])> {
        self.entries
            .iter()
            .map(|(line, results)| (line.as_str(), results.as_deref().unwrap_or_default()))
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(line, _)| line.as_str())
    }
}

impl Serialize for QueryTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (line, results) in self.iter() {
            map.serialize_entry(line, results)?;
        }
        map.end()
    }
}
