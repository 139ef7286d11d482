//! Bounded breadth-first web crawler feeding the shared index.
//!
//! Each scheduled URL becomes one pool task: fetch, optionally enqueue the
//! page's links, strip markup, then merge a page-local index into the shared
//! one. The frontier caps the total number of URLs ever scheduled.

mod frontier;
pub mod html;
pub mod http;

pub use frontier::Frontier;

use crate::error::{IndexerError, Result};
use crate::work_queue::{Submitter, WorkQueue};
use log::{debug, info, warn};
use sift_index::{text, InvertedIndex, SynchronizedIndex};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 10 * 1024 * 1024;

/// Crawl limits and network settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerConfig {
    /// Upper bound on URLs scheduled, seed included.
    pub max_links: usize,
    pub connect_timeout: Duration,
    /// Budget for receiving a whole response, not just one read.
    pub read_timeout: Duration,
    /// Responses longer than this are truncated.
    pub max_response_bytes: u64,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_links: 50,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(10),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: concat!("sift/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

struct CrawlState {
    index: Arc<SynchronizedIndex>,
    frontier: Frontier,
    config: CrawlerConfig,
    submitter: Submitter,
}

pub struct Crawler {
    state: Arc<CrawlState>,
    queue: WorkQueue,
}

impl Crawler {
    pub fn new(
        index: Arc<SynchronizedIndex>,
        threads: usize,
        config: CrawlerConfig,
    ) -> Result<Self> {
        if config.max_links == 0 {
            return Err(IndexerError::InvalidConfig(
                "max_links must be at least 1".to_string(),
            ));
        }
        if config.max_response_bytes == 0 {
            return Err(IndexerError::InvalidConfig(
                "max_response_bytes must be at least 1".to_string(),
            ));
        }
        let queue = WorkQueue::new(threads)?;
        let state = Arc::new(CrawlState {
            index,
            frontier: Frontier::new(config.max_links),
            config,
            submitter: queue.submitter(),
        });
        Ok(Self { state, queue })
    }

    /// Schedules `seed` as the first page. Returns once the seed is queued;
    /// use [`Crawler::await_idle`] or [`Crawler::close`] to wait for the crawl.
    pub fn start(&self, seed: &str) -> Result<()> {
        let mut url = Url::parse(seed)?;
        if url.scheme() != "http" {
            return Err(IndexerError::UnsupportedScheme(url.scheme().to_string()));
        }
        url.set_fragment(None);

        if self.state.frontier.try_insert(&url) {
            info!("crawling from {url} (limit {})", self.state.frontier.capacity());
            schedule(&self.state, url);
        } else {
            debug!("seed {url} already scheduled");
        }
        Ok(())
    }

    pub fn await_idle(&self) {
        self.queue.await_idle();
    }

    pub fn shutdown(&self) {
        self.queue.shutdown();
    }

    /// Waits for every scheduled page, then stops the pool.
    pub fn close(&self) {
        self.queue.close();
    }

    /// URLs scheduled so far, in ascending order.
    #[must_use]
    pub fn discovered(&self) -> Vec<Url> {
        self.state.frontier.urls()
    }

    #[must_use]
    pub fn frontier(&self) -> &Frontier {
        &self.state.frontier
    }
}

fn schedule(state: &Arc<CrawlState>, url: Url) {
    let task_state = Arc::clone(state);
    state
        .submitter
        .submit(move || crawl_page(&task_state, &url));
}

fn crawl_page(state: &Arc<CrawlState>, url: &Url) -> Result<()> {
    let response = http::fetch(url, &state.config)?;
    if !response.is_html() {
        debug!("skipping non-HTML page {url}");
        return Ok(());
    }

    if !state.frontier.is_full() {
        for link in resolve_links(url, response.body()) {
            if state.frontier.try_insert(&link) {
                schedule(state, link);
            }
        }
    }

    let words = text::split(&html::strip_html(response.body()));
    let mut local = InvertedIndex::new();
    local.add_all(&words, url.as_str(), 1);
    state.index.merge(local);
    debug!("indexed {url} ({} words)", words.len());
    Ok(())
}

/// Absolute http links found on the page at `base`, fragments removed.
///
/// Empty and same-page (`#...`) hrefs are skipped, as are links that fail to
/// resolve or use any scheme other than `http`.
#[must_use]
pub fn resolve_links(base: &Url, html_text: &str) -> Vec<Url> {
    html::list_links(html_text)
        .into_iter()
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter_map(|href| match base.join(href) {
            Ok(mut link) if link.scheme() == "http" => {
                link.set_fragment(None);
                Some(link)
            }
            Ok(_) => None,
            Err(err) => {
                warn!("ignoring link {href:?} on {base}: {err}");
                None
            }
        })
        .collect()
}
