use crate::error::{Result, SearchError};
use crate::table::QueryTable;
use log::{debug, info};
use sift_index::{text, QueryResult, SynchronizedIndex};
use sift_indexer::WorkQueue;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Turns query lines into ranked prefix-search results.
pub trait QueryProcessor {
    /// Trims `line`, searches for its words and records the outcome under the
    /// trimmed line. Lines without words map to an empty result list.
    fn parse_line(&mut self, line: &str);

    /// Feeds every line of the file at `path` to [`QueryProcessor::parse_line`]
    /// and returns how many lines were read.
    fn read_path(&mut self, path: &Path) -> Result<usize> {
        let wrap = |source| SearchError::ReadQueries {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = BufReader::new(File::open(path).map_err(wrap)?);
        let mut buffer = Vec::new();
        let mut lines = 0;

        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer).map_err(wrap)? == 0 {
                break;
            }
            self.parse_line(&String::from_utf8_lossy(&buffer));
            lines += 1;
        }

        info!("read {lines} queries from {}", path.display());
        Ok(lines)
    }

    /// Blocks until every submitted line has its results.
    fn finish(&mut self) {}

    /// Copy of the results gathered so far, in submission order.
    fn table(&self) -> QueryTable;
}

fn search(index: &SynchronizedIndex, line: &str) -> Vec<QueryResult> {
    let terms = text::split(line);
    if terms.is_empty() {
        return Vec::new();
    }
    index.prefix_search(&terms)
}

/// Answers each line on the calling thread as it arrives.
pub struct SequentialQueryProcessor {
    index: Arc<SynchronizedIndex>,
    table: QueryTable,
}

impl SequentialQueryProcessor {
    #[must_use]
    pub fn new(index: Arc<SynchronizedIndex>) -> Self {
        Self {
            index,
            table: QueryTable::new(),
        }
    }

    #[must_use]
    pub fn results(&self, line: &str) -> Option<&[QueryResult]> {
        self.table.get(line.trim())
    }
}

impl QueryProcessor for SequentialQueryProcessor {
    fn parse_line(&mut self, line: &str) {
        let line = line.trim();
        let results = search(&self.index, line);
        debug!("query {line:?}: {} documents", results.len());
        self.table.fill(line, results);
    }

    fn table(&self) -> QueryTable {
        self.table.clone()
    }
}

/// Searches on a worker pool while keeping results in submission order.
///
/// Each line's slot is reserved before its search is queued, so the table
/// order never depends on which search finishes first.
pub struct ConcurrentQueryProcessor {
    index: Arc<SynchronizedIndex>,
    table: Arc<Mutex<QueryTable>>,
    queue: WorkQueue,
}

impl ConcurrentQueryProcessor {
    pub fn new(index: Arc<SynchronizedIndex>, threads: usize) -> Result<Self> {
        Ok(Self {
            index,
            table: Arc::new(Mutex::new(QueryTable::new())),
            queue: WorkQueue::new(threads)?,
        })
    }

    /// Results for `line`, or `None` while its search is pending or if it was
    /// never submitted.
    #[must_use]
    pub fn results(&self, line: &str) -> Option<Vec<QueryResult>> {
        lock(&self.table).get(line.trim()).map(<[QueryResult]>::to_vec)
    }

    /// Waits for every queued search, then stops the pool.
    pub fn close(&self) {
        self.queue.close();
    }
}

impl QueryProcessor for ConcurrentQueryProcessor {
    fn parse_line(&mut self, line: &str) {
        let line = line.trim().to_string();
        lock(&self.table).reserve(&line);

        let index = Arc::clone(&self.index);
        let table = Arc::clone(&self.table);
        self.queue.submit(move || {
            let results = search(&index, &line);
            debug!("query {line:?}: {} documents", results.len());
            lock(&table).fill(&line, results);
            Ok(())
        });
    }

    fn finish(&mut self) {
        self.queue.await_idle();
    }

    fn table(&self) -> QueryTable {
        lock(&self.table).clone()
    }
}

fn lock(table: &Mutex<QueryTable>) -> MutexGuard<'_, QueryTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}
