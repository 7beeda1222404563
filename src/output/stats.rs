//! Crawl statistics
//!
//! Workers record outcomes into a shared [`StatsRecorder`]; the coordinator
//! snapshots it into [`CrawlStatistics`] once the crawl has drained.

use crate::state::RejectReason;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Thread-safe counters updated by workers during a crawl
#[derive(Debug)]
pub struct StatsRecorder {
    started: Instant,
    saved: AtomicU64,
    fetch_attempts: AtomicU64,
    links_discovered: AtomicU64,
    links_enqueued: AtomicU64,
    out_of_origin_links: AtomicU64,
    path_collisions: AtomicU64,
    rejected: Mutex<BTreeMap<String, u64>>,
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            saved: AtomicU64::new(0),
            fetch_attempts: AtomicU64::new(0),
            links_discovered: AtomicU64::new(0),
            links_enqueued: AtomicU64::new(0),
            out_of_origin_links: AtomicU64::new(0),
            path_collisions: AtomicU64::new(0),
            rejected: Mutex::new(BTreeMap::new()),
        }
    }

    /// Records a saved page; returns the running total
    pub fn record_saved(&self) -> u64 {
        self.saved.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_rejected(&self, reason: &RejectReason) {
        let mut rejected = self
            .rejected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *rejected.entry(reason.label().to_string()).or_insert(0) += 1;
    }

    pub fn record_fetch_attempts(&self, attempts: u32) {
        self.fetch_attempts
            .fetch_add(u64::from(attempts), Ordering::Relaxed);
    }

    /// Records the links found on one page
    pub fn record_links(&self, discovered: usize, enqueued: usize, out_of_origin: usize) {
        self.links_discovered
            .fetch_add(discovered as u64, Ordering::Relaxed);
        self.links_enqueued
            .fetch_add(enqueued as u64, Ordering::Relaxed);
        self.out_of_origin_links
            .fetch_add(out_of_origin as u64, Ordering::Relaxed);
    }

    /// Records a saved page whose storage path already held another URL
    pub fn record_path_collision(&self) {
        self.path_collisions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Takes a consistent snapshot of all counters
    pub fn snapshot(&self, duplicates_skipped: u64) -> CrawlStatistics {
        let rejected = self
            .rejected
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        CrawlStatistics {
            saved: self.saved.load(Ordering::Relaxed),
            total_rejected: rejected.values().sum(),
            rejected_by_reason: rejected,
            fetch_attempts: self.fetch_attempts.load(Ordering::Relaxed),
            links_discovered: self.links_discovered.load(Ordering::Relaxed),
            links_enqueued: self.links_enqueued.load(Ordering::Relaxed),
            out_of_origin_links: self.out_of_origin_links.load(Ordering::Relaxed),
            duplicates_skipped,
            path_collisions: self.path_collisions.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }
}

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Pages fetched and stored
    pub saved: u64,

    /// URLs rejected, all reasons combined
    pub total_rejected: u64,

    /// Rejections grouped by [`RejectReason::label`]
    pub rejected_by_reason: BTreeMap<String, u64>,

    /// HTTP exchanges performed, retries included
    pub fetch_attempts: u64,

    /// Distinct links found across all saved pages
    pub links_discovered: u64,

    /// Links that entered the work queue
    pub links_enqueued: u64,

    /// Links skipped because they left the allowed origin
    pub out_of_origin_links: u64,

    /// Queue entries skipped because their URL was already claimed
    pub duplicates_skipped: u64,

    /// Saved pages that overwrote another URL's stored file
    pub path_collisions: u64,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Number of rejections recorded under a reason label
    pub fn rejected(&self, label: &str) -> u64 {
        self.rejected_by_reason.get(label).copied().unwrap_or(0)
    }

    /// Total skipped work: duplicate claims plus out-of-origin links
    pub fn skipped(&self) -> u64 {
        self.duplicates_skipped + self.out_of_origin_links
    }

    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.saved as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages saved: {}", stats.saved);
    println!("  Pages rejected: {}", stats.total_rejected);
    println!("  Skipped: {}", stats.skipped());
    println!("  Fetch attempts: {}", stats.fetch_attempts);
    println!(
        "  Duration: {:.1}s ({:.2} pages/sec)",
        stats.elapsed.as_secs_f64(),
        stats.pages_per_second()
    );
    println!();

    println!("Links:");
    println!("  Discovered: {}", stats.links_discovered);
    println!("  Enqueued: {}", stats.links_enqueued);
    println!("  Outside origin: {}", stats.out_of_origin_links);
    println!("  Duplicate claims skipped: {}", stats.duplicates_skipped);
    if stats.path_collisions > 0 {
        println!("  Storage path collisions: {}", stats.path_collisions);
    }
    println!();

    if !stats.rejected_by_reason.is_empty() {
        println!("Rejections:");
        let mut reasons: Vec<_> = stats.rejected_by_reason.iter().collect();
        reasons.sort_by(|a, b| b.1.cmp(a.1));

        for (reason, count) in reasons {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    let attempted = stats.saved + stats.total_rejected;
    let success_rate = if attempted > 0 {
        (stats.saved as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} claimed URLs saved)",
        success_rate, stats.saved, attempted
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_snapshot() {
        let recorder = StatsRecorder::new();
        assert_eq!(recorder.record_saved(), 1);
        assert_eq!(recorder.record_saved(), 2);
        recorder.record_rejected(&RejectReason::HttpStatus(404));
        recorder.record_rejected(&RejectReason::HttpStatus(500));
        recorder.record_rejected(&RejectReason::WriteFailed);
        recorder.record_fetch_attempts(3);
        recorder.record_fetch_attempts(1);
        recorder.record_links(5, 2, 1);
        recorder.record_path_collision();

        let stats = recorder.snapshot(4);
        assert_eq!(stats.saved, 2);
        assert_eq!(stats.total_rejected, 3);
        assert_eq!(stats.rejected("http_status"), 2);
        assert_eq!(stats.rejected("write_failed"), 1);
        assert_eq!(stats.rejected("transport"), 0);
        assert_eq!(stats.fetch_attempts, 4);
        assert_eq!(stats.links_discovered, 5);
        assert_eq!(stats.links_enqueued, 2);
        assert_eq!(stats.skipped(), 5);
        assert_eq!(stats.path_collisions, 1);
    }

    #[test]
    fn test_pages_per_second_zero_elapsed() {
        let stats = CrawlStatistics::default();
        assert_eq!(stats.pages_per_second(), 0.0);
    }
}
