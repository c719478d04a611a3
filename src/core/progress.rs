use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::models::scan_result::ScanStatus;

/// Running counters for one batch run, shared by the scanner and orchestrator.
pub struct ProgressTracker {
    pub requests_processed: AtomicUsize,
    pub requests_failed: AtomicUsize,
    pub files_seen: AtomicUsize,
    pub stale_files: AtomicUsize,
    pub start_time: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            requests_processed: AtomicUsize::new(0),
            requests_failed: AtomicUsize::new(0),
            files_seen: AtomicUsize::new(0),
            stale_files: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_request(&self, status: ScanStatus) {
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
        if status != ScanStatus::Ok {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn add_files(&self, count: usize) {
        self.files_seen.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_stale(&self, count: usize) {
        self.stale_files.fetch_add(count, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            requests_processed: self.requests_processed.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            files_seen: self.files_seen.load(Ordering::Relaxed),
            stale_files: self.stale_files.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub requests_processed: usize,
    pub requests_failed: usize,
    pub files_seen: usize,
    pub stale_files: usize,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request_counts_failures() {
        let progress = ProgressTracker::new();
        progress.record_request(ScanStatus::Ok);
        progress.record_request(ScanStatus::PathInvalid);
        progress.record_request(ScanStatus::InvalidInterval);
        progress.add_files(5);
        progress.add_stale(2);

        let snap = progress.snapshot();
        assert_eq!(snap.requests_processed, 3);
        assert_eq!(snap.requests_failed, 2);
        assert_eq!(snap.files_seen, 5);
        assert_eq!(snap.stale_files, 2);
    }
}
