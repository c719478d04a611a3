//! Metric samples handed to a `MetricSink`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::host::HostIdentity;

use super::scan_result::ScanResult;

pub const DEFAULT_METRIC_NAME: &str = "OldFileCount";
pub const DEFAULT_NAMESPACE: &str = "Windows/Default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricUnit {
    Count,
}

/// A name/value tag that disambiguates one time series from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricSample {
    pub metric_name: String,
    pub value: i64,
    pub unit: MetricUnit,
    pub timestamp: DateTime<Utc>,
    pub dimensions: Vec<Dimension>,
}

impl MetricSample {
    /// Builds the sample for one scan result. Failed results carry their
    /// sentinel count unchanged.
    pub fn from_result(
        metric_name: &str,
        result: &ScanResult,
        host: &HostIdentity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            metric_name: metric_name.to_string(),
            value: result.stale_count,
            unit: MetricUnit::Count,
            timestamp,
            dimensions: vec![
                Dimension::new("InstanceId", &host.instance_id),
                Dimension::new("FolderPath", result.path.to_string_lossy()),
                Dimension::new("InstanceName", &host.instance_name),
            ],
        }
    }

    pub fn dimension(&self, name: &str) -> Option<&str> {
        self.dimensions
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scan_result::{ScanRequest, ScanStatus};

    fn host() -> HostIdentity {
        HostIdentity::new("i-0abc", "build-01")
    }

    #[test]
    fn test_sample_dimensions() {
        let request = ScanRequest::new("/var/spool/in", "3d");
        let now = Utc::now();
        let result = ScanResult::ok(&request, now, 7);

        let sample = MetricSample::from_result(DEFAULT_METRIC_NAME, &result, &host(), now);
        assert_eq!(sample.metric_name, "OldFileCount");
        assert_eq!(sample.value, 7);
        assert_eq!(sample.unit, MetricUnit::Count);
        assert_eq!(sample.dimension("InstanceId"), Some("i-0abc"));
        assert_eq!(sample.dimension("FolderPath"), Some("/var/spool/in"));
        assert_eq!(sample.dimension("InstanceName"), Some("build-01"));
        assert_eq!(sample.dimension("Missing"), None);
    }

    #[test]
    fn test_sample_keeps_sentinel() {
        let request = ScanRequest::new("/nope", "3d");
        let result = ScanResult::failed(&request, None, ScanStatus::PathInvalid, "missing");
        let sample = MetricSample::from_result(DEFAULT_METRIC_NAME, &result, &host(), Utc::now());
        assert_eq!(sample.value, -1);
    }

    #[test]
    fn test_sample_wire_shape() {
        let request = ScanRequest::new("/data", "1h");
        let now = Utc::now();
        let result = ScanResult::ok(&request, now, 2);
        let sample = MetricSample::from_result("Custom", &result, &host(), now);

        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["MetricName"], "Custom");
        assert_eq!(json["Unit"], "Count");
        assert_eq!(json["Value"], 2);
        assert_eq!(json["Dimensions"][1]["Name"], "FolderPath");
        assert_eq!(json["Dimensions"][1]["Value"], "/data");
    }
}
