use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Count reported for any result that is not `Ok`.
pub const SENTINEL_COUNT: i64 = -1;

/// One unit of work: a directory and the age past which its files are stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(rename = "Path")]
    pub path: PathBuf,
    #[serde(rename = "TimeInterval")]
    pub interval: String,
}

impl ScanRequest {
    pub fn new(path: impl Into<PathBuf>, interval: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            interval: interval.into(),
        }
    }
}

/// Creation time of a single directory entry, read during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileObservation {
    pub path: PathBuf,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Ok,
    PathInvalid,
    InvalidInterval,
    ScanError,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::PathInvalid => write!(f, "path invalid"),
            Self::InvalidInterval => write!(f, "invalid interval"),
            Self::ScanError => write!(f, "scan error"),
        }
    }
}

/// Outcome of one `ScanRequest`. `stale_count` is `SENTINEL_COUNT` whenever
/// `status` is not `Ok`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub path: PathBuf,
    pub interval: String,
    /// Absent when the interval could not be turned into a cutoff.
    pub cutoff: Option<DateTime<Utc>>,
    pub stale_count: i64,
    pub status: ScanStatus,
    pub error: Option<String>,
}

impl ScanResult {
    pub fn ok(request: &ScanRequest, cutoff: DateTime<Utc>, stale_count: i64) -> Self {
        Self {
            path: request.path.clone(),
            interval: request.interval.clone(),
            cutoff: Some(cutoff),
            stale_count,
            status: ScanStatus::Ok,
            error: None,
        }
    }

    pub fn failed(
        request: &ScanRequest,
        cutoff: Option<DateTime<Utc>>,
        status: ScanStatus,
        error: impl Into<String>,
    ) -> Self {
        Self {
            path: request.path.clone(),
            interval: request.interval.clone(),
            cutoff,
            stale_count: SENTINEL_COUNT,
            status,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ScanStatus::Ok
    }
}
