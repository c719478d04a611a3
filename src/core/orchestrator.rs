//! Runs the scanner over a batch of requests. A bad request never stops the
//! batch: it produces a failed `ScanResult` and the next request runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::models::scan_result::{ScanRequest, ScanResult, ScanStatus};

use super::interval::IntervalSpec;
use super::progress::ProgressTracker;
use super::scanner::{ScanOutcome, Scanner};

pub struct Orchestrator {
    scanner: Scanner,
}

impl Orchestrator {
    pub fn new(progress: Arc<ProgressTracker>) -> Self {
        Self {
            scanner: Scanner::new(progress),
        }
    }

    pub fn progress(&self) -> &Arc<ProgressTracker> {
        self.scanner.progress()
    }

    /// One result per request, in request order.
    pub async fn run(&self, requests: &[ScanRequest], now: DateTime<Utc>) -> Vec<ScanResult> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let result = self.run_one(request, now).await;
            self.progress().record_request(result.status);
            results.push(result);
        }
        results
    }

    async fn run_one(&self, request: &ScanRequest, now: DateTime<Utc>) -> ScanResult {
        let cutoff = match IntervalSpec::parse(&request.interval).and_then(|spec| spec.cutoff(now)) {
            Ok(cutoff) => cutoff,
            Err(e) => {
                warn!(path = %request.path.display(), "{}", e);
                return ScanResult::failed(request, None, ScanStatus::InvalidInterval, e.to_string());
            }
        };

        let outcome = self.scanner.scan(&request.path, cutoff).await;
        match &outcome {
            ScanOutcome::Counted {
                stale,
                total,
                skipped,
            } => {
                info!(
                    path = %request.path.display(),
                    interval = %request.interval,
                    %cutoff,
                    stale = *stale,
                    total = *total,
                    skipped = *skipped,
                    "scanned directory"
                );
                ScanResult::ok(request, cutoff, outcome.stale_count())
            }
            ScanOutcome::PathInvalid(msg) | ScanOutcome::Failed(msg) => {
                warn!(path = %request.path.display(), status = %outcome.status(), "{}", msg);
                ScanResult::failed(request, Some(cutoff), outcome.status(), msg.clone())
            }
        }
    }
}
