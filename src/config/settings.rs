use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::metric::{DEFAULT_METRIC_NAME, DEFAULT_NAMESPACE};
use crate::models::scan_result::ScanRequest;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What to do with results whose scan failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelPolicy {
    /// Report the sentinel count so the failure is visible on dashboards.
    #[default]
    Emit,
    Skip,
}

/// What to do after a sample fails to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    StopOnFirst,
    Continue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub metric_name: String,
    pub namespace: String,
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub sentinel_policy: SentinelPolicy,
    pub failure_policy: FailurePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            metric_name: DEFAULT_METRIC_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            endpoint: None,
            api_key: None,
            timeout_secs: 10,
            sentinel_policy: SentinelPolicy::Emit,
            failure_policy: FailurePolicy::StopOnFirst,
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json(path)
    }

    /// Per-submission timeout. `timeout_secs: 0` disables it.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Loads the batch of `{ "Path", "TimeInterval" }` records to scan.
pub fn load_requests(path: &Path) -> Result<Vec<ScanRequest>, ConfigError> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"namespace":"Linux/Spool","failure_policy":"continue"}"#)
                .unwrap();
        assert_eq!(settings.namespace, "Linux/Spool");
        assert_eq!(settings.failure_policy, FailurePolicy::Continue);
        assert_eq!(settings.metric_name, "OldFileCount");
        assert_eq!(settings.sentinel_policy, SentinelPolicy::Emit);
        assert_eq!(settings.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_zero_timeout_disables_timeout() {
        let settings: Settings = serde_json::from_str(r#"{"timeout_secs":0}"#).unwrap();
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn test_request_records_shape() {
        let requests: Vec<ScanRequest> = serde_json::from_str(
            r#"[{"Path":"/srv/in","TimeInterval":"3d"},{"Path":"/srv/out","TimeInterval":"5M"}]"#,
        )
        .unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], ScanRequest::new("/srv/in", "3d"));
        assert_eq!(requests[1].interval, "5M");
    }

    #[test]
    fn test_load_requests_missing_file() {
        let err = load_requests(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
