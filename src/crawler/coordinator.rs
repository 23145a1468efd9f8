//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Opening and finishing the crawl run
//! - Seeding and sharing the frontier between workers
//! - Fetching, classifying and storing pages
//! - Extracting records from the target page
//! - Feeding discovered links back into the frontier

use crate::config::Config;
use crate::crawler::classifier::TargetClassifier;
use crate::crawler::extractor::RecordExtractor;
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchResult};
use crate::crawler::frontier::{Frontier, SharedFrontier};
use crate::crawler::parser::extract_links;
use crate::crawler::throttle::HostThrottle;
use crate::storage::{open_storage, Page, RunStatus, SqliteStorage, Storage};
use crate::url::LinkFilter;
use crate::SiftError;
use reqwest::Client;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use url::Url;

/// Pages between two progress log lines
const PROGRESS_INTERVAL: usize = 10;

/// State of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Running,
    Done,
}

/// Summary of a finished crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlReport {
    pub run_id: i64,
    pub status: RunStatus,
    /// Pages fetched successfully
    pub pages_fetched: usize,
    /// Pages written to the store
    pub pages_stored: usize,
    /// URLs skipped as failed or not markup
    pub pages_skipped: usize,
    /// URL of the target page, when found
    pub target_url: Option<String>,
    pub records_inserted: usize,
    /// Records whose email was already stored
    pub records_existing: usize,
    /// Records rejected during extraction
    pub records_rejected: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
struct Tally {
    pages_fetched: usize,
    pages_stored: usize,
    pages_skipped: usize,
    target_url: Option<String>,
    records_inserted: usize,
    records_existing: usize,
    records_rejected: usize,
}

/// Everything a worker needs, shared behind one `Arc`
struct CrawlContext {
    client: Client,
    storage: Arc<Mutex<SqliteStorage>>,
    frontier: Arc<SharedFrontier>,
    filter: LinkFilter,
    classifier: TargetClassifier,
    extractor: RecordExtractor,
    throttle: HostThrottle,
    run_id: i64,
    tally: Mutex<Tally>,
    started: Instant,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    storage: Arc<Mutex<SqliteStorage>>,
    frontier: Arc<SharedFrontier>,
    client: Client,
    run_id: i64,
    state: CrawlState,
}

impl Coordinator {
    /// Creates a coordinator and opens a new crawl run
    ///
    /// With `fresh`, previously stored pages are removed first. Records are
    /// always kept so a repeated crawl reports them as already existing.
    pub fn new(
        config: Config,
        storage: Arc<Mutex<SqliteStorage>>,
        config_hash: &str,
        fresh: bool,
    ) -> Result<Self, SiftError> {
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        let run_id = {
            let mut storage = lock(&storage);
            if fresh {
                tracing::info!("Clearing previously fetched pages");
                storage.clear_pages()?;
            }
            storage.create_run(config_hash)?
        };

        let frontier = Arc::new(SharedFrontier::new(Frontier::with_limit(
            config.crawler.max_pages,
        )));
        let seeded = frontier.add_all(config.crawler.seeds.iter().cloned());
        tracing::info!("Seeded frontier with {} URLs", seeded);

        Ok(Self {
            config: Arc::new(config),
            storage,
            frontier,
            client,
            run_id,
            state: CrawlState::Running,
        })
    }

    /// Handle to the shared frontier; calling `stop()` on it ends the crawl
    pub fn frontier(&self) -> Arc<SharedFrontier> {
        Arc::clone(&self.frontier)
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Runs the crawl until the frontier is done
    ///
    /// Spawns `workers` tasks that each loop: claim a URL, fetch it, store
    /// the page, then either extract records (target page) or queue its
    /// links. The run row is finalized as `stopped` when the frontier was
    /// stopped, `completed` when it ran dry and `failed` on error.
    pub async fn run(&mut self) -> Result<CrawlReport, SiftError> {
        tracing::info!(
            "Starting crawl run {} with {} worker(s)",
            self.run_id,
            self.config.crawler.workers
        );

        let context = Arc::new(CrawlContext {
            client: self.client.clone(),
            storage: Arc::clone(&self.storage),
            frontier: Arc::clone(&self.frontier),
            filter: LinkFilter::from_config(&self.config.crawler),
            classifier: TargetClassifier::from_config(&self.config.target),
            extractor: RecordExtractor::from_config(&self.config.target),
            throttle: HostThrottle::from_millis(self.config.crawler.request_delay_ms),
            run_id: self.run_id,
            tally: Mutex::new(Tally::default()),
            started: Instant::now(),
        });

        let handles: Vec<_> = (0..self.config.crawler.workers.max(1))
            .map(|worker_id| {
                let context = Arc::clone(&context);
                tokio::spawn(async move { context.work(worker_id).await })
            })
            .collect();

        let mut failure = None;
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Crawl worker failed: {}", e);
                self.frontier.stop();
                failure.get_or_insert_with(|| SiftError::Worker(e.to_string()));
            }
        }

        self.state = CrawlState::Done;

        let status = if failure.is_some() {
            RunStatus::Failed
        } else if self.frontier.is_stopped() {
            RunStatus::Stopped
        } else {
            RunStatus::Completed
        };
        lock(&self.storage).finish_run(self.run_id, status)?;

        if let Some(e) = failure {
            return Err(e);
        }

        let report = context.report(status);
        tracing::info!(
            "Crawl {}: {} pages fetched in {:?}",
            status.to_db_string(),
            report.pages_fetched,
            report.elapsed
        );
        Ok(report)
    }
}

impl CrawlContext {
    async fn work(&self, worker_id: u32) {
        tracing::debug!("Worker {} started", worker_id);

        while let Some(url) = self.frontier.claim().await {
            if let Err(e) = self.process_url(&url).await {
                tracing::error!("Error processing {}: {}", url, e);
            }
            self.frontier.complete();
        }

        tracing::debug!("Worker {} finished", worker_id);
    }

    /// Processes a single URL
    ///
    /// Markup is only parsed inside synchronous helpers, after the last
    /// await point of this function.
    async fn process_url(&self, url: &str) -> Result<(), SiftError> {
        self.throttle.wait(url).await;

        tracing::info!("Visiting {}", url);
        let (final_url, body) = match fetch_url(&self.client, url).await {
            FetchResult::Success {
                final_url,
                status_code,
                content_type,
                body,
            } => {
                tracing::debug!(
                    "Fetched {} ({}, {}, {} bytes)",
                    final_url,
                    status_code,
                    content_type,
                    body.len()
                );
                (final_url, body)
            }
            FetchResult::NotApplicable { content_type } => {
                tracing::debug!("Skipping {}: content type '{}'", url, content_type);
                self.tally().pages_skipped += 1;
                return Ok(());
            }
            FetchResult::Failed { error } => {
                tracing::warn!("Skipping {}: {}", url, error);
                self.tally().pages_skipped += 1;
                return Ok(());
            }
        };

        self.record_fetch();

        lock(&self.storage).upsert_page(&Page::new(url, body.as_str()), Some(self.run_id))?;
        self.tally().pages_stored += 1;

        if self.classifier.is_target(&body) {
            self.handle_target(url, &body)?;
        } else {
            let base = Url::parse(&final_url)?;
            let links = extract_links(&body, &base, &self.filter);
            let found = links.len();
            let added = self.frontier.add_all(links);
            tracing::debug!("{}: {} links, {} new", url, found, added);
        }

        Ok(())
    }

    fn handle_target(&self, url: &str, body: &str) -> Result<(), SiftError> {
        tracing::info!("Target page found: {}", url);
        self.frontier.stop();

        let extraction = self.extractor.extract(body);
        tracing::info!(
            "Extracted {} records ({} rejected)",
            extraction.records.len(),
            extraction.rejected.len()
        );

        let mut inserted = 0;
        let mut existing = 0;
        {
            let mut storage = lock(&self.storage);
            for record in &extraction.records {
                match storage.insert_record(record, Some(url)) {
                    Ok(()) => {
                        tracing::info!("Inserted record: {} <{}>", record.name, record.email);
                        inserted += 1;
                    }
                    Err(e) if e.is_duplicate() => {
                        tracing::info!("Record with email {} already exists", record.email);
                        existing += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        let mut tally = self.tally();
        tally.target_url = Some(url.to_string());
        tally.records_inserted += inserted;
        tally.records_existing += existing;
        tally.records_rejected += extraction.rejected.len();
        Ok(())
    }

    fn record_fetch(&self) {
        let fetched = {
            let mut tally = self.tally();
            tally.pages_fetched += 1;
            tally.pages_fetched
        };

        if fetched % PROGRESS_INTERVAL == 0 {
            let elapsed = self.started.elapsed();
            tracing::info!(
                "Progress: {} pages fetched, {} in frontier, {:.2} pages/sec",
                fetched,
                self.frontier.pending_count(),
                fetched as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
            );
        }
    }

    fn tally(&self) -> MutexGuard<'_, Tally> {
        self.tally.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn report(&self, status: RunStatus) -> CrawlReport {
        let tally = self.tally();
        CrawlReport {
            run_id: self.run_id,
            status,
            pages_fetched: tally.pages_fetched,
            pages_stored: tally.pages_stored,
            pages_skipped: tally.pages_skipped,
            target_url: tally.target_url.clone(),
            records_inserted: tally.records_inserted,
            records_existing: tally.records_existing,
            records_rejected: tally.records_rejected,
            elapsed: self.started.elapsed(),
        }
    }
}

fn lock(storage: &Mutex<SqliteStorage>) -> MutexGuard<'_, SqliteStorage> {
    storage.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Runs a complete crawl against the configured database
///
/// # Example
///
/// ```no_run
/// use site_sift::config::load_config_with_hash;
/// use site_sift::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("site-sift.toml"))?;
/// let report = run_crawl(config, &hash, false).await?;
/// println!("{} records inserted", report.records_inserted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: &str,
    fresh: bool,
) -> Result<CrawlReport, SiftError> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let mut coordinator =
        Coordinator::new(config, Arc::new(Mutex::new(storage)), config_hash, fresh)?;
    coordinator.run().await
}
