//! Work queue and visited set shared by the worker pool
//!
//! This module handles:
//! - FIFO queueing of discovered URLs (duplicates allowed until claimed)
//! - The atomic claim that moves a URL from queued to in flight
//! - Per-URL lifecycle tracking (`PageState`)
//! - Drain detection: queue empty and nothing in flight
//!
//! All mutable state sits behind a single mutex. Claiming pops the queue and
//! marks the URL visited under the same lock, so two workers can never both
//! observe a URL as unvisited.

use crate::state::PageState;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use url::Url;

/// A URL waiting in the work queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// Canonical URL to fetch
    pub url: Url,

    /// Canonical URL of the page that discovered it; `None` for seeds
    pub parent: Option<String>,
}

#[derive(Debug, Default)]
struct SchedulerState {
    /// Pending work; may hold the same URL more than once
    queue: VecDeque<QueuedUrl>,

    /// Lifecycle of every URL seen so far; absent means unseen
    states: HashMap<String, PageState>,

    /// Number of outstanding claims
    in_flight: usize,

    /// Set once drain is observed; never cleared
    drained: bool,

    /// Queue entries discarded because their URL was already claimed
    duplicates_skipped: u64,
}

impl SchedulerState {
    fn is_visited(&self, url: &str) -> bool {
        matches!(self.states.get(url), Some(state) if *state != PageState::Queued)
    }

    fn check_drained(&mut self) -> bool {
        if !self.drained && self.queue.is_empty() && self.in_flight == 0 {
            self.drained = true;
        }
        self.drained
    }
}

/// Scheduler coordinates the work queue between workers
///
/// Workers loop on [`Scheduler::claim_next`]; it blocks while the queue is
/// empty but other workers are still in flight (they may enqueue more), and
/// returns `None` to every caller once the crawl has drained.
#[derive(Debug)]
pub struct Scheduler {
    state: Mutex<SchedulerState>,
    notify: Notify,
}

impl Scheduler {
    /// Creates a scheduler seeded with start URLs
    pub fn new(seeds: impl IntoIterator<Item = Url>) -> Self {
        let scheduler = Self {
            state: Mutex::new(SchedulerState::default()),
            notify: Notify::new(),
        };

        for seed in seeds {
            scheduler.enqueue(seed, None);
        }

        scheduler
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a URL to the queue unless it has already been visited
    ///
    /// URLs that are merely queued may be enqueued again with a different
    /// parent; whichever entry is dequeued first wins the claim.
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued, `false` if it was already visited or
    /// the crawl has drained.
    pub fn enqueue(&self, url: Url, parent: Option<String>) -> bool {
        let mut state = self.lock();

        if state.drained || state.is_visited(url.as_str()) {
            return false;
        }

        state
            .states
            .entry(url.as_str().to_string())
            .or_insert(PageState::Queued);
        state.queue.push_back(QueuedUrl { url, parent });
        drop(state);

        self.notify.notify_waiters();
        true
    }

    /// Waits for the next unclaimed URL and claims it
    ///
    /// # Returns
    ///
    /// * `Some(Claim)` - A URL this worker now exclusively owns
    /// * `None` - The crawl has drained; the worker should exit
    pub async fn claim_next(&self) -> Option<Claim<'_>> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before inspecting state so a wake-up between the check
            // and the await is not lost.
            notified.as_mut().enable();

            {
                let mut state = self.lock();

                if state.drained {
                    return None;
                }

                while let Some(queued) = state.queue.pop_front() {
                    let key = queued.url.as_str().to_string();
                    if state.states.get(&key) == Some(&PageState::Queued) {
                        state.states.insert(key, PageState::InFlight);
                        state.in_flight += 1;
                        tracing::trace!("Claimed {}", queued.url);
                        return Some(Claim {
                            scheduler: self,
                            url: queued.url,
                            parent: queued.parent,
                            aliases: Vec::new(),
                            finished: false,
                        });
                    }

                    state.duplicates_skipped += 1;
                    tracing::trace!("Skipping already claimed {}", queued.url);
                }

                if state.check_drained() {
                    drop(state);
                    tracing::debug!("Work queue drained");
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    fn release(&self, urls: &[String], outcome: PageState) {
        let mut state = self.lock();

        for url in urls {
            let current = state.states.get(url).copied().unwrap_or(PageState::InFlight);
            match current.transition(outcome) {
                Ok(next) => {
                    state.states.insert(url.clone(), next);
                }
                Err(e) => tracing::warn!("{} for {}", e, url),
            }
        }

        state.in_flight = state.in_flight.saturating_sub(1);
        let drained = state.check_drained();
        drop(state);

        if drained {
            tracing::debug!("Last in-flight URL resolved, work queue drained");
        }
        self.notify.notify_waiters();
    }

    /// Returns the lifecycle state of a URL, if it has been seen
    pub fn state_of(&self, url: &str) -> Option<PageState> {
        self.lock().states.get(url).copied()
    }

    /// Number of URLs that have been claimed (the visited set size)
    pub fn visited_count(&self) -> usize {
        self.lock()
            .states
            .values()
            .filter(|state| **state != PageState::Queued)
            .count()
    }

    /// Number of entries currently in the queue, duplicates included
    pub fn queue_len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of URLs currently being processed
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Returns true once the queue is empty with nothing in flight
    pub fn is_drained(&self) -> bool {
        self.lock().check_drained()
    }

    /// Queue entries dropped because their URL had already been claimed
    pub fn duplicates_skipped(&self) -> u64 {
        self.lock().duplicates_skipped
    }
}

/// Exclusive ownership of one in-flight URL
///
/// Dropping the claim resolves it. A claim dropped without
/// [`Claim::finish`] (for example during a panic) resolves as rejected, so
/// drain detection cannot stall on a lost worker.
#[derive(Debug)]
pub struct Claim<'a> {
    scheduler: &'a Scheduler,
    url: Url,
    parent: Option<String>,
    aliases: Vec<String>,
    finished: bool,
}

impl Claim<'_> {
    /// The claimed canonical URL
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The discovering page, or `None` for seeds
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Claims a second URL under this claim (a redirect target)
    ///
    /// # Returns
    ///
    /// `true` if `url` is now owned by this claim, `false` if another worker
    /// already claimed it.
    pub fn claim_alias(&mut self, url: &Url) -> bool {
        if url == &self.url {
            return true;
        }

        let key = url.as_str().to_string();
        if self.aliases.contains(&key) {
            return true;
        }

        let mut state = self.scheduler.lock();
        match state.states.get(&key) {
            None | Some(PageState::Queued) => {
                state.states.insert(key.clone(), PageState::InFlight);
                drop(state);
                self.aliases.push(key);
                true
            }
            Some(_) => false,
        }
    }

    /// Resolves the claim as saved or rejected
    pub fn finish(mut self, outcome: PageState) {
        self.resolve(outcome);
    }

    fn resolve(&mut self, outcome: PageState) {
        if self.finished {
            return;
        }
        self.finished = true;

        let mut urls = Vec::with_capacity(1 + self.aliases.len());
        urls.push(self.url.as_str().to_string());
        urls.append(&mut self.aliases);

        self.scheduler.release(&urls, outcome);
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.resolve(PageState::Rejected);
    }
}
