mod config;
mod export;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use config::FileConfig;
use log::{error, info};
use sift_index::{InvertedIndex, SynchronizedIndex};
use sift_indexer::{
    index_directory, thread_count, Crawler, CrawlerConfig, DirectoryIndexer, DEFAULT_THREADS,
};
use sift_search::{ConcurrentQueryProcessor, QueryProcessor, QueryTable, SequentialQueryProcessor};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "sift",
    version,
    about = "Build an inverted index from text files or a web crawl and answer prefix queries"
)]
struct Args {
    /// Directory tree of .txt/.text files to index.
    #[arg(long, value_name = "DIR", conflicts_with = "seed")]
    input: Option<PathBuf>,

    /// http URL to start a bounded crawl from.
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Worker threads; without a value uses 5. Omit to build and query on one thread.
    #[arg(
        long,
        value_name = "N",
        num_args = 0..=1,
        default_missing_value = "5",
        allow_negative_numbers = true
    )]
    threads: Option<i64>,

    /// Write the index as JSON [default path: index.json].
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "index.json")]
    index: Option<PathBuf>,

    /// File with one query per line.
    #[arg(long, value_name = "PATH")]
    query: Option<PathBuf>,

    /// Write query results as JSON [default path: results.json].
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "results.json")]
    results: Option<PathBuf>,

    /// TOML file with threads, [crawler] and [indexer] settings.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Command-line flags merged over the config file.
struct Settings {
    threads: Option<usize>,
    crawler: CrawlerConfig,
    extensions: Vec<String>,
}

impl Settings {
    fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        let threads = args
            .threads
            .or(file.threads)
            .map(thread_count)
            .transpose()?;

        Ok(Self {
            threads,
            crawler: file.crawler_config(),
            extensions: file.extensions(),
        })
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::resolve(&args)?;
    let index = Arc::new(SynchronizedIndex::new());
    let mut failed = false;

    let build = if let Some(input) = &args.input {
        Some(build_from_directory(input, &settings, &index))
    } else {
        args.seed
            .as_deref()
            .map(|seed| build_from_crawl(seed, &settings, &index))
    };
    if let Some(Err(err)) = build {
        error!("build failed: {err:#}");
        failed = true;
    }

    if let Some(path) = &args.index {
        if let Err(err) = export::write_index(path, &index) {
            error!("index export failed: {err:#}");
            failed = true;
        }
    }

    let mut table = QueryTable::new();
    if let Some(path) = &args.query {
        match run_queries(path, settings.threads, &index) {
            Ok(results) => table = results,
            Err(err) => {
                error!("query processing failed: {err:#}");
                failed = true;
            }
        }
    }

    if let Some(path) = &args.results {
        if let Err(err) = export::write_json(path, &table) {
            error!("results export failed: {err:#}");
            failed = true;
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn build_from_directory(
    root: &Path,
    settings: &Settings,
    index: &Arc<SynchronizedIndex>,
) -> Result<()> {
    match settings.threads {
        Some(threads) => {
            let indexer = DirectoryIndexer::new(Arc::clone(index), threads)?
                .with_extensions(settings.extensions.iter().cloned());
            let files = indexer
                .traverse(root)
                .with_context(|| format!("index {}", root.display()))?;
            indexer.close();
            info!("indexed {files} files with {threads} threads");
        }
        None => {
            let mut local = InvertedIndex::new();
            index_directory(root, settings.extensions.as_slice(), &mut local)
                .with_context(|| format!("index {}", root.display()))?;
            index.merge(local);
        }
    }
    Ok(())
}

fn build_from_crawl(seed: &str, settings: &Settings, index: &Arc<SynchronizedIndex>) -> Result<()> {
    let threads = settings.threads.unwrap_or(DEFAULT_THREADS);
    let crawler = Crawler::new(Arc::clone(index), threads, settings.crawler.clone())?;
    crawler
        .start(seed)
        .with_context(|| format!("crawl from {seed}"))?;
    crawler.close();
    info!("crawled {} pages from {seed}", crawler.frontier().len());
    Ok(())
}

fn run_queries(
    path: &Path,
    threads: Option<usize>,
    index: &Arc<SynchronizedIndex>,
) -> Result<QueryTable> {
    let mut processor: Box<dyn QueryProcessor> = match threads {
        Some(threads) => Box::new(ConcurrentQueryProcessor::new(Arc::clone(index), threads)?),
        None => Box::new(SequentialQueryProcessor::new(Arc::clone(index))),
    };

    let read = processor.read_path(path);
    processor.finish();
    read?;
    Ok(processor.table())
}
