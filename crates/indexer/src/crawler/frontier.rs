use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

/// Crawl frontier: every URL ever scheduled, capped at a fixed size.
///
/// The capacity check, the membership check and the insert happen under one
/// lock, so concurrent discovery can neither overshoot the cap nor schedule
/// the same URL twice.
#[derive(Debug)]
pub struct Frontier {
    seen: Mutex<HashSet<Url>>,
    capacity: usize,
}

impl Frontier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: Mutex::new(HashSet::with_capacity(capacity)),
            capacity,
        }
    }

    /// Records `url` and returns `true` if it is new and room remains.
    pub fn try_insert(&self, url: &Url) -> bool {
        let mut seen = self.seen();
        if seen.len() >= self.capacity || seen.contains(url) {
            return false;
        }
        seen.insert(url.clone())
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.seen().len() >= self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen().is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Scheduled URLs in ascending order.
    #[must_use]
    pub fn urls(&self) -> Vec<Url> {
        let mut urls: Vec<Url> = self.seen().iter().cloned().collect();
        urls.sort();
        urls
    }

    fn seen(&self) -> MutexGuard<'_, HashSet<Url>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
