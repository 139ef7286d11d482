use crate::error::{IndexerError, Result};
use crate::work_queue::WorkQueue;
use log::{debug, info, warn};
use sift_index::{text, InvertedIndex, SynchronizedIndex};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Extensions treated as plain text, compared case-insensitively.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

#[must_use]
pub fn is_text_file<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext))
        })
}

/// Indexes one file into `index`, numbering words from 1 across lines.
///
/// The document identifier is the path as given. Invalid UTF-8 is replaced
/// rather than rejected. Returns the number of words added.
pub fn index_file(path: &Path, index: &mut InvertedIndex) -> Result<usize> {
    let document = path.to_string_lossy();
    let wrap = |source| IndexerError::IndexFile {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(wrap)?);
    let mut line = Vec::new();
    let mut position = 1;

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).map_err(wrap)? == 0 {
            break;
        }
        let words = text::split(&String::from_utf8_lossy(&line));
        position = index.add_all(&words, &document, position);
    }

    Ok(position - 1)
}

/// Text files under `root` in walk order.
///
/// Entries that cannot be read are logged and skipped together with their
/// subtree; the walk carries on with their siblings.
pub fn text_files<'a, S: AsRef<str>>(
    root: &Path,
    extensions: &'a [S],
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(move |path| is_text_file(path, extensions))
}

/// Builds an index from every text file under `root` on the calling thread.
///
/// Returns the number of files indexed; unreadable files are logged and
/// skipped.
pub fn index_directory<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
    index: &mut InvertedIndex,
) -> Result<usize> {
    ensure_directory(root)?;

    let mut indexed = 0;
    for path in text_files(root, extensions) {
        match index_file(&path, index) {
            Ok(words) => {
                debug!("indexed {} ({words} words)", path.display());
                indexed += 1;
            }
            Err(err) => warn!("{err}"),
        }
    }

    info!("indexed {indexed} files under {}", root.display());
    Ok(indexed)
}

/// Walks a directory tree and indexes each text file on a worker pool.
///
/// The walk itself runs on the caller's thread. Each file is parsed into a
/// private [`InvertedIndex`] and published into the shared index with one
/// merge.
pub struct DirectoryIndexer {
    index: Arc<SynchronizedIndex>,
    queue: WorkQueue,
    extensions: Vec<String>,
}

impl DirectoryIndexer {
    pub fn new(index: Arc<SynchronizedIndex>, threads: usize) -> Result<Self> {
        Ok(Self {
            index,
            queue: WorkQueue::new(threads)?,
            extensions: DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        })
    }

    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Submits one task per text file under `root` and returns how many were
    /// submitted. Does not wait for them; see [`DirectoryIndexer::close`].
    pub fn traverse(&self, root: &Path) -> Result<usize> {
        ensure_directory(root)?;

        let mut submitted = 0;
        for path in text_files(root, self.extensions.as_slice()) {
            let index = Arc::clone(&self.index);
            self.queue.submit(move || {
                let mut local = InvertedIndex::new();
                let words = index_file(&path, &mut local)?;
                index.merge(local);
                debug!("indexed {} ({words} words)", path.display());
                Ok(())
            });
            submitted += 1;
        }

        info!("queued {submitted} files under {}", root.display());
        Ok(submitted)
    }

    pub fn await_idle(&self) {
        self.queue.await_idle();
    }

    pub fn shutdown(&self) {
        self.queue.shutdown();
    }

    /// Waits for every queued file, then stops the pool.
    pub fn close(&self) {
        self.queue.close();
    }
}

fn ensure_directory(root: &Path) -> Result<()> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(IndexerError::InvalidPath(format!(
            "not a directory: {}",
            root.display()
        )))
    }
}
