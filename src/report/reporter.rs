use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::config::host::HostIdentity;
use crate::config::settings::{FailurePolicy, SentinelPolicy, Settings};
use crate::models::metric::MetricSample;
use crate::models::scan_result::ScanResult;

use super::sink::{MetricSink, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
}

/// Tally of one reporting pass.
#[derive(Debug, Default)]
pub struct ReportOutcome {
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Results never attempted because an earlier submission failed.
    pub not_attempted: usize,
    pub first_error: Option<TransportError>,
}

impl ReportOutcome {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

pub struct Reporter<S> {
    sink: S,
    metric_name: String,
    namespace: String,
    sentinel_policy: SentinelPolicy,
    failure_policy: FailurePolicy,
}

impl<S: MetricSink> Reporter<S> {
    pub fn new(sink: S, settings: &Settings) -> Self {
        Self {
            sink,
            metric_name: settings.metric_name.clone(),
            namespace: settings.namespace.clone(),
            sentinel_policy: settings.sentinel_policy,
            failure_policy: settings.failure_policy,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Submits the sample for one result, unless the result failed and
    /// sentinels are being skipped.
    pub async fn report(
        &self,
        result: &ScanResult,
        host: &HostIdentity,
        timestamp: DateTime<Utc>,
    ) -> Result<Delivery, TransportError> {
        if !result.is_ok() && self.sentinel_policy == SentinelPolicy::Skip {
            debug!(path = %result.path.display(), status = %result.status, "skipping failed result");
            return Ok(Delivery::Skipped);
        }

        let sample = MetricSample::from_result(&self.metric_name, result, host, timestamp);
        self.sink.submit(&self.namespace, &sample).await?;
        debug!(path = %result.path.display(), value = sample.value, "reported metric");
        Ok(Delivery::Sent)
    }

    /// Reports every result in order. With `StopOnFirst` the remaining
    /// results are left unreported after the first transport failure.
    pub async fn report_all(
        &self,
        results: &[ScanResult],
        host: &HostIdentity,
        timestamp: DateTime<Utc>,
    ) -> ReportOutcome {
        let mut outcome = ReportOutcome::default();

        for (i, result) in results.iter().enumerate() {
            match self.report(result, host, timestamp).await {
                Ok(Delivery::Sent) => outcome.sent += 1,
                Ok(Delivery::Skipped) => outcome.skipped += 1,
                Err(e) => {
                    error!(path = %result.path.display(), "Failed to report metric: {}", e);
                    outcome.failed += 1;
                    if outcome.first_error.is_none() {
                        outcome.first_error = Some(e);
                    }
                    if self.failure_policy == FailurePolicy::StopOnFirst {
                        outcome.not_attempted = results.len() - i - 1;
                        break;
                    }
                }
            }
        }

        info!(
            sent = outcome.sent,
            skipped = outcome.skipped,
            failed = outcome.failed,
            not_attempted = outcome.not_attempted,
            "reporting finished"
        );
        outcome
    }
}
