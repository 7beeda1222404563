//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the worker pool that drives a crawl:
//! - Preparing seeds and the output root
//! - Spawning workers that claim, fetch, store, and parse pages
//! - Feeding discovered links back into the scheduler
//! - Writing the index once the queue has drained

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::node::{dedup_links, PageNode};
use crate::crawler::parser::parse_html;
use crate::crawler::scheduler::{Claim, Scheduler};
use crate::output::{write_index, CrawlIndex, CrawlStatistics, StatsRecorder};
use crate::state::{PageState, RejectReason};
use crate::url::{canonicalize, canonicalize_url, local_path_for, Origin};
use crate::{ConfigError, SiteGraphError};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use url::Url;

/// Saved-page interval between progress log lines
const PROGRESS_INTERVAL: u64 = 25;

/// Result of a completed crawl
#[derive(Debug)]
pub struct CrawlReport {
    /// Location of the written index file
    pub index_path: PathBuf,

    /// Canonical seed URLs the crawl started from
    pub start_urls: Vec<String>,

    /// Every saved page, keyed by canonical URL
    pub nodes: BTreeMap<String, PageNode>,

    pub statistics: CrawlStatistics,
}

/// State shared by all workers of one crawl
struct CrawlContext {
    scheduler: Scheduler,
    fetcher: Fetcher,
    origin: Origin,
    output_root: PathBuf,
    nodes: Mutex<BTreeMap<String, PageNode>>,
    /// Storage path -> canonical URL last written there
    stored_paths: Mutex<HashMap<String, String>>,
    stats: StatsRecorder,
}

impl CrawlContext {
    /// Records that `url` is stored at `path`
    ///
    /// Distinct URLs can map to one path (`/page` and `/page.php` both store
    /// as `page.html`); the later write wins and the collision is logged.
    fn reserve_path(&self, path: &str, url: &str) {
        let previous = self
            .stored_paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(path.to_string(), url.to_string());

        if let Some(previous) = previous.filter(|previous| previous != url) {
            tracing::warn!(
                "Storage path {} already holds {}; overwriting with {}",
                path,
                previous,
                url
            );
            self.stats.record_path_collision();
        }
    }
}

/// Main crawler coordinator structure
#[derive(Debug)]
pub struct Coordinator {
    config: Config,
    seeds: Vec<Url>,
    origin: Origin,
    fetcher: Fetcher,
    output_root: PathBuf,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Seeds are canonicalized in order; unparsable ones are skipped with a
    /// warning and repeats are dropped. The output root is created here, so
    /// an unwritable destination fails before any request is made.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SiteGraphError)` - No usable seeds, output root not creatable,
    ///   or the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, SiteGraphError> {
        let seeds = prepare_seeds(&config.seeds)?;
        let origin = Origin::from_config(&config.origin);

        for seed in seeds.iter().filter(|seed| !origin.allows(seed)) {
            tracing::warn!("Seed {} is outside origin {} and will be rejected", seed, origin);
        }

        let output_root = PathBuf::from(&config.output.root);
        std::fs::create_dir_all(&output_root).map_err(|source| SiteGraphError::OutputRoot {
            path: output_root.display().to_string(),
            source,
        })?;

        let fetcher = Fetcher::new(&config, origin.clone())?;

        Ok(Self {
            config,
            seeds,
            origin,
            fetcher,
            output_root,
        })
    }

    /// Canonical seeds in crawl order
    pub fn seeds(&self) -> &[Url] {
        &self.seeds
    }

    /// Runs the crawl to completion
    ///
    /// Spawns the configured number of workers, waits until the queue has
    /// drained, then writes the index. A panicking worker is logged and its
    /// claimed URL resolves as rejected; the remaining workers carry on.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The index was written
    /// * `Err(SiteGraphError)` - The index could not be written
    pub async fn run(self) -> Result<CrawlReport, SiteGraphError> {
        let start_urls: Vec<String> = self.seeds.iter().map(|u| u.to_string()).collect();
        let workers = self.config.crawler.workers.max(1);

        tracing::info!(
            "Starting crawl of {} with {} seed(s), {} worker(s), max {} concurrent request(s)",
            self.origin,
            start_urls.len(),
            workers,
            self.config.crawler.max_concurrency
        );

        let context = Arc::new(CrawlContext {
            scheduler: Scheduler::new(self.seeds),
            fetcher: self.fetcher,
            origin: self.origin,
            output_root: self.output_root,
            nodes: Mutex::new(BTreeMap::new()),
            stored_paths: Mutex::new(HashMap::new()),
            stats: StatsRecorder::new(),
        });

        let mut tasks = JoinSet::new();
        for worker_id in 0..workers {
            tasks.spawn(worker_loop(Arc::clone(&context), worker_id));
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Worker task failed: {}", e);
            }
        }

        let statistics = context
            .stats
            .snapshot(context.scheduler.duplicates_skipped());

        let nodes = std::mem::take(
            &mut *context
                .nodes
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );

        let index_path = context.output_root.join(&self.config.output.index_file);
        let index = CrawlIndex::new(nodes.values(), &start_urls);
        write_index(&index_path, &index).await?;

        tracing::info!(
            "Crawl complete: {} saved, {} rejected in {:.1}s",
            statistics.saved,
            statistics.total_rejected,
            statistics.elapsed.as_secs_f64()
        );

        Ok(CrawlReport {
            index_path,
            start_urls,
            nodes,
            statistics,
        })
    }
}

/// Runs a complete crawl operation
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl drained and the index was written
/// * `Err(SiteGraphError)` - Crawl could not start or finish
pub async fn crawl(config: Config) -> Result<CrawlReport, SiteGraphError> {
    Coordinator::new(config)?.run().await
}

/// Canonicalizes seeds, dropping invalid entries and repeats
fn prepare_seeds(raw: &[String]) -> Result<Vec<Url>, SiteGraphError> {
    let mut seen = HashSet::new();
    let mut seeds = Vec::new();

    for seed in raw {
        match canonicalize(seed) {
            Ok(url) => {
                if seen.insert(url.as_str().to_string()) {
                    seeds.push(url);
                }
            }
            Err(e) => tracing::warn!("Skipping invalid seed {:?}: {}", seed, e),
        }
    }

    if seeds.is_empty() {
        return Err(ConfigError::NoSeeds.into());
    }

    Ok(seeds)
}

async fn worker_loop(context: Arc<CrawlContext>, worker_id: u32) {
    tracing::debug!("Worker {} started", worker_id);

    while let Some(mut claim) = context.scheduler.claim_next().await {
        let url = claim.url().clone();

        match process_url(&context, &mut claim).await {
            Ok(()) => {
                claim.finish(PageState::Saved);
                let saved = context.stats.record_saved();
                if saved % PROGRESS_INTERVAL == 0 {
                    tracing::info!(
                        "Progress: {} pages saved, {} queued, {} in flight",
                        saved,
                        context.scheduler.queue_len(),
                        context.scheduler.in_flight()
                    );
                }
            }
            Err(reason) => {
                claim.finish(PageState::Rejected);
                context.stats.record_rejected(&reason);
                if reason.is_transient() || reason == RejectReason::OriginViolation {
                    tracing::warn!("Rejected {}: {}", url, reason);
                } else {
                    tracing::debug!("Rejected {}: {}", url, reason);
                }
            }
        }
    }

    tracing::debug!("Worker {} finished", worker_id);
}

/// Fetches, stores, and parses one claimed URL
///
/// Children are enqueued before the claim is resolved, so the scheduler
/// never sees an empty queue with no work in flight while links are
/// still pending.
async fn process_url(context: &CrawlContext, claim: &mut Claim<'_>) -> Result<(), RejectReason> {
    if !context.origin.allows(claim.url()) {
        return Err(RejectReason::OriginViolation);
    }

    let outcome = context.fetcher.fetch(claim.url()).await;
    context.stats.record_fetch_attempts(outcome.attempts());
    let page = outcome.into_result()?;

    let final_url = canonicalize_url(&page.final_url).map_err(|_| RejectReason::OriginViolation)?;
    if !context.origin.allows(&final_url) {
        return Err(RejectReason::OriginViolation);
    }
    if final_url != *claim.url() {
        tracing::debug!("{} redirected to {}", claim.url(), final_url);
        if !claim.claim_alias(&final_url) {
            return Err(RejectReason::DuplicateTarget);
        }
    }

    let local_path = local_path_for(&final_url);
    let file_path = local_path.to_path_buf(&context.output_root);
    if let Some(dir) = file_path.parent() {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            tracing::error!("Failed to create {}: {}", dir.display(), e);
            RejectReason::WriteFailed
        })?;
    }
    tokio::fs::write(&file_path, &page.body)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write {}: {}", file_path.display(), e);
            RejectReason::WriteFailed
        })?;
    context.reserve_path(&local_path.relative_path, final_url.as_str());

    let parsed = parse_html(&page.text(), &final_url);
    let links = dedup_links(
        parsed
            .links
            .iter()
            .filter_map(|link| canonicalize_url(link).ok()),
    );

    let parent = final_url.to_string();
    let mut enqueued = 0;
    let mut out_of_origin = 0;
    for link in &links {
        if !context.origin.allows(link) {
            out_of_origin += 1;
        } else if context
            .scheduler
            .enqueue(link.clone(), Some(parent.clone()))
        {
            enqueued += 1;
        }
    }
    context
        .stats
        .record_links(links.len(), enqueued, out_of_origin);

    let node = PageNode {
        url: parent.clone(),
        title: parsed.title,
        local_path: local_path.relative_path,
        parent: claim.parent().map(str::to_string),
        children: links.iter().map(|link| link.to_string()).collect(),
    };

    context
        .nodes
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .insert(parent, node);

    Ok(())
}
