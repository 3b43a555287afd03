//! Bounded-concurrency crawl frontier
//!
//! The frontier owns the FIFO queue of URLs and the enqueued and visited
//! sets. A single dispatcher task pops URLs and spawns one task per URL,
//! gated by a semaphore of `max_concurrent` permits. Each task renders its
//! page, matches the text against the dictionary, reports a `CrawlResult`
//! and enqueues qualifying links.
//!
//! The frontier is finished once it has been started, its queue is empty,
//! no task is in flight and no `FrontierHold` is outstanding. At that point
//! the renderer is closed exactly once and the completion signal fires.

use crate::content::{tokenize, ContentFinder};
use crate::crawler::renderer::{PageRenderer, RenderError};
use crate::output::{CrawlOutcome, CrawlResult, FrontierStatistics, ResultSink};
use crate::url::{crawlable_links, InterestingDomains};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{watch, Notify, OwnedSemaphorePermit, Semaphore};
use url::Url;

/// Default number of pages rendered concurrently
pub const DEFAULT_MAX_CONCURRENT_PAGES: usize = 20;

/// Default per-page render timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Frontier tuning knobs
#[derive(Debug, Clone)]
pub struct FrontierConfig {
    /// Maximum number of renders in flight
    pub max_concurrent: usize,

    /// Timeout applied to every render
    pub request_timeout: Duration,

    /// Tokens shorter than this are dropped before matching
    pub min_token_length: usize,

    /// Directory for snapshots of matched pages; `None` disables capture
    pub capture_dir: Option<PathBuf>,

    /// Log progress every this many results (0 disables)
    pub progress_every: u64,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT_PAGES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            min_token_length: 1,
            capture_dir: None,
            progress_every: 1000,
        }
    }
}

/// What `enqueue` did with a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Added to the queue
    Queued,

    /// Already visited; queued to be reported as already visited
    Revisit,

    /// Enqueued before but not yet visited; ignored
    Duplicate,

    /// Invalid URL, or the frontier no longer accepts work
    Rejected,
}

#[derive(Debug, Default)]
struct Shared {
    queue: VecDeque<String>,
    enqueued: HashSet<String>,
    visited: HashSet<String>,
    in_flight: usize,
    holds: usize,
    started: Option<Instant>,
    closed: bool,
    finished: bool,
}

impl Shared {
    fn is_drained(&self) -> bool {
        self.started.is_some()
            && !self.finished
            && self.queue.is_empty()
            && self.in_flight == 0
            && (self.closed || self.holds == 0)
    }
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    duplicates: AtomicU64,
    rejected: AtomicU64,
    matched: AtomicU64,
    no_match: AtomicU64,
    already_visited: AtomicU64,
    failed: AtomicU64,
}

struct Inner {
    config: FrontierConfig,
    finder: ContentFinder,
    domains: InterestingDomains,
    renderer: Arc<dyn PageRenderer>,
    sink: Arc<dyn ResultSink>,
    shared: Mutex<Shared>,
    work: Notify,
    permits: Arc<Semaphore>,
    renderer_closed: AtomicBool,
    done_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
    counters: Counters,
}

/// Handle to a crawl frontier; clones share the same frontier
#[derive(Clone)]
pub struct CrawlFrontier {
    inner: Arc<Inner>,
}

/// Keeps a started frontier from finishing while it is alive
///
/// Obtained from [`CrawlFrontier::hold`]. Ignored once the frontier is
/// closed.
#[must_use = "the frontier may finish as soon as the hold is dropped"]
pub struct FrontierHold {
    frontier: CrawlFrontier,
}

impl Drop for FrontierHold {
    fn drop(&mut self) {
        self.frontier.shared().holds -= 1;
        self.frontier.inner.work.notify_one();
    }
}

/// Marks a dispatched URL in flight until the task ends, even on panic
struct InFlight {
    frontier: CrawlFrontier,
    _permit: OwnedSemaphorePermit,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.frontier.shared().in_flight -= 1;
        self.frontier.inner.work.notify_one();
    }
}

impl CrawlFrontier {
    /// Creates a frontier; nothing runs until [`start`](Self::start)
    pub fn new(
        config: FrontierConfig,
        finder: ContentFinder,
        domains: InterestingDomains,
        renderer: Arc<dyn PageRenderer>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let (done_tx, done_rx) = watch::channel(false);
        let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

        Self {
            inner: Arc::new(Inner {
                config,
                finder,
                domains,
                renderer,
                sink,
                shared: Mutex::new(Shared::default()),
                work: Notify::new(),
                permits,
                renderer_closed: AtomicBool::new(false),
                done_tx,
                done_rx,
                counters: Counters::default(),
            }),
        }
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks URLs as already visited
    ///
    /// Enqueuing one of them later yields an `AlreadyVisited` result without
    /// rendering.
    pub fn mark_visited<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut shared = self.shared();
        for url in urls {
            if let Ok(parsed) = Url::parse(url.as_ref()) {
                shared.visited.insert(parsed.to_string());
            }
        }
    }

    /// Submits a URL for crawling
    ///
    /// The checks against the visited and enqueued sets and the insertion
    /// happen under one lock, so concurrent callers never queue the same
    /// unvisited URL twice. A URL that has already been visited is queued
    /// again and reported as `AlreadyVisited` without rendering.
    pub fn enqueue(&self, url: &str) -> Admission {
        let counters = &self.inner.counters;

        let normalized = match Url::parse(url) {
            Ok(parsed) => parsed.to_string(),
            Err(e) => {
                tracing::debug!("Rejecting unparsable URL {}: {}", url, e);
                counters.rejected.fetch_add(1, Ordering::Relaxed);
                return Admission::Rejected;
            }
        };

        let admission = {
            let mut shared = self.shared();

            if shared.closed || shared.finished {
                counters.rejected.fetch_add(1, Ordering::Relaxed);
                return Admission::Rejected;
            }

            if shared.visited.contains(&normalized) {
                tracing::debug!("Requeued visited {}", normalized);
                shared.queue.push_back(normalized);
                Admission::Revisit
            } else if shared.enqueued.insert(normalized.clone()) {
                tracing::debug!("Enqueued {}", normalized);
                shared.queue.push_back(normalized);
                Admission::Queued
            } else {
                counters.duplicates.fetch_add(1, Ordering::Relaxed);
                return Admission::Duplicate;
            }
        };

        counters.enqueued.fetch_add(1, Ordering::Relaxed);
        self.inner.work.notify_one();
        admission
    }

    /// Starts the dispatcher; calling it again has no effect
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        {
            let mut shared = self.shared();
            if shared.started.is_some() {
                return;
            }
            shared.started = Some(Instant::now());
        }

        tracing::debug!(
            "Starting frontier with {} concurrent pages",
            self.inner.config.max_concurrent.max(1)
        );

        let frontier = self.clone();
        tokio::spawn(async move { frontier.dispatch().await });
    }

    /// Prevents the frontier from finishing until the hold is dropped
    pub fn hold(&self) -> FrontierHold {
        self.shared().holds += 1;
        FrontierHold {
            frontier: self.clone(),
        }
    }

    /// Returns true once the frontier has finished and released the renderer
    pub fn is_finished(&self) -> bool {
        *self.inner.done_rx.borrow()
    }

    /// Waits until the frontier has finished
    pub async fn wait(&self) {
        let mut done = self.inner.done_rx.clone();
        loop {
            if *done.borrow_and_update() {
                return;
            }
            if done.changed().await.is_err() {
                return;
            }
        }
    }

    /// Refuses further work, drops queued URLs and waits for in-flight tasks
    pub async fn close(&self) {
        let (started, discarded) = {
            let mut shared = self.shared();
            shared.closed = true;
            let discarded = shared.queue.len();
            shared.queue.clear();
            (shared.started.is_some(), discarded)
        };

        if discarded > 0 {
            tracing::info!("Frontier closed, discarding {} queued URLs", discarded);
        }

        if started {
            self.inner.work.notify_one();
        } else {
            self.finish();
        }

        self.wait().await;
    }

    /// Returns a snapshot of the frontier's counters
    pub fn statistics(&self) -> FrontierStatistics {
        let c = &self.inner.counters;
        FrontierStatistics {
            enqueued: c.enqueued.load(Ordering::Relaxed),
            duplicates: c.duplicates.load(Ordering::Relaxed),
            rejected: c.rejected.load(Ordering::Relaxed),
            matched: c.matched.load(Ordering::Relaxed),
            no_match: c.no_match.load(Ordering::Relaxed),
            already_visited: c.already_visited.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
        }
    }

    async fn dispatch(self) {
        loop {
            let permit = match self.inner.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            let url = loop {
                {
                    let mut shared = self.shared();
                    if shared.finished {
                        return;
                    }
                    if let Some(url) = shared.queue.pop_front() {
                        shared.in_flight += 1;
                        break url;
                    }
                    if shared.is_drained() {
                        drop(shared);
                        self.finish();
                        return;
                    }
                }
                self.inner.work.notified().await;
            };

            let guard = InFlight {
                frontier: self.clone(),
                _permit: permit,
            };
            let frontier = self.clone();
            tokio::spawn(async move {
                frontier.process(url).await;
                drop(guard);
            });
        }
    }

    fn finish(&self) {
        {
            let mut shared = self.shared();
            if shared.finished {
                return;
            }
            shared.finished = true;
        }

        if !self.inner.renderer_closed.swap(true, Ordering::SeqCst) {
            self.inner.renderer.close();
        }

        if let Err(e) = self.inner.sink.flush() {
            tracing::warn!("Failed to flush results: {}", e);
        }

        let stats = self.statistics();
        tracing::info!(
            "Frontier finished: {} results ({} matched, {} failed)",
            stats.processed(),
            stats.matched,
            stats.failed
        );

        self.inner.done_tx.send_replace(true);
    }

    async fn process(&self, url: String) {
        let first_visit = self.shared().visited.insert(url.clone());

        let outcome = if first_visit {
            self.render_and_match(&url).await
        } else {
            tracing::debug!("Already visited {}", url);
            CrawlOutcome::AlreadyVisited
        };

        self.record(CrawlResult::new(url, outcome));
    }

    async fn render_and_match(&self, url: &str) -> CrawlOutcome {
        let inner = &self.inner;
        let timeout = inner.config.request_timeout;

        let rendered = match tokio::time::timeout(timeout, inner.renderer.render(url, timeout)).await {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                tracing::debug!("Failed to render {}: {}", url, e);
                return CrawlOutcome::Failed {
                    reason: e.to_string(),
                };
            }
            Err(_) => {
                tracing::debug!("Timed out rendering {}", url);
                return CrawlOutcome::Failed {
                    reason: RenderError::Timeout.to_string(),
                };
            }
        };

        let tokens = tokenize(&rendered.text, inner.config.min_token_length);
        let phrases = inner.finder.find(&tokens);

        let mut links = Vec::new();
        for link in crawlable_links(&rendered.links) {
            if inner.domains.is_interesting(&link.hostname) {
                self.enqueue(&link.url);
            }
            links.push(link.url);
        }

        if phrases.is_empty() {
            return CrawlOutcome::NoMatch { links };
        }

        tracing::debug!("Matched {:?} on {}", phrases, url);

        if let Some(dir) = &inner.config.capture_dir {
            match inner.renderer.capture(url, dir).await {
                Ok(path) => tracing::debug!("Captured {} to {}", url, path.display()),
                Err(e) => tracing::warn!("Failed to capture {}: {}", url, e),
            }
        }

        CrawlOutcome::Matched { phrases, links }
    }

    fn record(&self, result: CrawlResult) {
        let counters = &self.inner.counters;
        let counter = match &result.outcome {
            CrawlOutcome::Matched { .. } => &counters.matched,
            CrawlOutcome::NoMatch { .. } => &counters.no_match,
            CrawlOutcome::AlreadyVisited => &counters.already_visited,
            CrawlOutcome::Failed { .. } => &counters.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let Err(e) = self.inner.sink.record_result(&result) {
            tracing::warn!("Failed to record result for {}: {}", result.url, e);
        }

        let every = self.inner.config.progress_every;
        if every > 0 {
            let processed = self.statistics().processed();
            if processed % every == 0 {
                let elapsed = self
                    .shared()
                    .started
                    .map(|started| started.elapsed().as_secs_f64())
                    .unwrap_or_default();
                tracing::info!("Crawled {} pages in {:.1}s", processed, elapsed);
            }
        }
    }
}
