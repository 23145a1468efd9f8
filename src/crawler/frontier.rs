//! URL frontier
//!
//! The frontier is a FIFO queue of URLs waiting to be fetched plus the set
//! of URLs already handed out. A URL is either pending or visited, never
//! both, and a visited URL is never queued again.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

/// Deduplicating FIFO queue of URLs to visit
#[derive(Debug, Default)]
pub struct Frontier {
    pending: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
    stopped: bool,
    max_pages: Option<usize>,
}

impl Frontier {
    /// Creates an empty, unbounded frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty frontier that stops after `max_pages` visits
    pub fn with_limit(max_pages: Option<usize>) -> Self {
        Self {
            max_pages,
            ..Self::default()
        }
    }

    /// Queues a URL unless it was already visited or queued
    ///
    /// Returns true when the URL was queued. Always false once stopped.
    pub fn add(&mut self, url: impl Into<String>) -> bool {
        if self.stopped {
            return false;
        }

        let url = url.into();
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }

        self.queued.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Takes the earliest queued URL and marks it visited
    ///
    /// Reaching the visit limit raises the stop signal.
    pub fn next(&mut self) -> Option<String> {
        if self.stopped {
            return None;
        }

        if let Some(limit) = self.max_pages {
            if self.visited.len() >= limit {
                tracing::info!("Visit limit of {} pages reached", limit);
                self.stop();
                return None;
            }
        }

        let url = self.pending.pop_front()?;
        self.queued.remove(&url);
        self.visited.insert(url.clone());
        Some(url)
    }

    /// True when nothing is pending or the frontier was stopped
    pub fn is_done(&self) -> bool {
        self.stopped || self.pending.is_empty()
    }

    /// Drops every pending URL and refuses further additions
    pub fn stop(&mut self) {
        self.pending.clear();
        self.queued.clear();
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[derive(Debug)]
struct FrontierState {
    frontier: Frontier,
    in_flight: usize,
}

/// A frontier shared by the crawl workers
///
/// Besides the queue itself this tracks how many URLs are being processed,
/// so an idle worker can tell "nothing left" from "more may arrive".
#[derive(Debug)]
pub struct SharedFrontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl SharedFrontier {
    pub fn new(frontier: Frontier) -> Self {
        Self {
            state: Mutex::new(FrontierState {
                frontier,
                in_flight: 0,
            }),
            changed: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Waits for the next URL to process
    ///
    /// Returns `None` once the frontier is stopped, or when it is empty and
    /// no other worker is still processing a URL. A returned URL must be
    /// handed back with [`SharedFrontier::complete`].
    pub async fn claim(&self) -> Option<String> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(url) = state.frontier.next() {
                    state.in_flight += 1;
                    return Some(url);
                }

                if state.frontier.is_stopped() || state.in_flight == 0 {
                    drop(state);
                    self.changed.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Marks a claimed URL as fully processed
    pub fn complete(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    /// Queues a batch of URLs, returning how many were new
    pub fn add_all<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        {
            let mut state = self.lock();
            for url in urls {
                if state.frontier.add(url) {
                    added += 1;
                }
            }
        }
        if added > 0 {
            self.changed.notify_waiters();
        }
        added
    }

    /// Stops the crawl: pending URLs are dropped and idle workers exit
    pub fn stop(&self) {
        self.lock().frontier.stop();
        self.changed.notify_waiters();
    }

    pub fn is_done(&self) -> bool {
        self.lock().frontier.is_done()
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().frontier.is_stopped()
    }

    pub fn pending_count(&self) -> usize {
        self.lock().frontier.pending_count()
    }

    pub fn visited_count(&self) -> usize {
        self.lock().frontier.visited_count()
    }
}
