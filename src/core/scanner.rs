use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::scan_result::{FileObservation, ScanStatus, SENTINEL_COUNT};

use super::progress::ProgressTracker;

/// Result of scanning a single directory against a cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// `skipped` counts entries that could not be stat'ed and were left out.
    Counted {
        stale: usize,
        total: usize,
        skipped: usize,
    },
    PathInvalid(String),
    Failed(String),
}

impl ScanOutcome {
    pub fn stale_count(&self) -> i64 {
        match self {
            Self::Counted { stale, .. } => i64::try_from(*stale).unwrap_or(i64::MAX),
            Self::PathInvalid(_) | Self::Failed(_) => SENTINEL_COUNT,
        }
    }

    pub fn status(&self) -> ScanStatus {
        match self {
            Self::Counted { .. } => ScanStatus::Ok,
            Self::PathInvalid(_) => ScanStatus::PathInvalid,
            Self::Failed(_) => ScanStatus::ScanError,
        }
    }
}

pub struct Scanner {
    progress: Arc<ProgressTracker>,
}

impl Scanner {
    pub fn new(progress: Arc<ProgressTracker>) -> Self {
        Self { progress }
    }

    pub fn progress(&self) -> &Arc<ProgressTracker> {
        &self.progress
    }

    /// Counts the files directly inside `path` created strictly before
    /// `cutoff`. Sub-directories are not entered.
    pub async fn scan(&self, path: &Path, cutoff: DateTime<Utc>) -> ScanOutcome {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return ScanOutcome::PathInvalid(format!("{} is not a directory", path.display()))
            }
            Err(e) => return ScanOutcome::PathInvalid(format!("{}: {}", path.display(), e)),
        }

        let dir = path.to_path_buf();
        let (mut observations, entry_errors) =
            match tokio::task::spawn_blocking(move || read_dir_batch(&dir)).await {
                Ok(Ok(batch)) => batch,
                Ok(Err(e)) => return ScanOutcome::Failed(format!("{}: {}", path.display(), e)),
                Err(e) => return ScanOutcome::Failed(format!("Task join error: {}", e)),
            };

        // Record entry-level I/O errors
        for (err_path, err_msg) in &entry_errors {
            warn!(path = %err_path.display(), "skipping unreadable entry: {}", err_msg);
        }

        observations.sort_by(|a, b| a.created.cmp(&b.created));
        for obs in &observations {
            let stale = obs.created < cutoff;
            debug!(path = %obs.path.display(), created = %obs.created, stale, "observed file");
        }

        let stale = count_stale(&observations, cutoff);
        self.progress.add_files(observations.len());
        self.progress.add_stale(stale);

        ScanOutcome::Counted {
            stale,
            total: observations.len(),
            skipped: entry_errors.len(),
        }
    }
}

/// Number of observations created strictly before `cutoff`.
pub fn count_stale(observations: &[FileObservation], cutoff: DateTime<Utc>) -> usize {
    observations.iter().filter(|o| o.created < cutoff).count()
}

/// Read the creation time of every file directly inside `dir_path` in one
/// blocking call. Returns (observations, entry_errors) or an error if the
/// directory itself can't be read. Entries that vanish between listing and
/// stat are skipped silently.
fn read_dir_batch(
    dir_path: &Path,
) -> io::Result<(Vec<FileObservation>, Vec<(PathBuf, String)>)> {
    let mut observations = Vec::new();
    let mut errors = Vec::new();

    for entry_result in std::fs::read_dir(dir_path)? {
        let entry_path: PathBuf = entry_result?.path();
        let meta = match std::fs::metadata(&entry_path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %entry_path.display(), "entry disappeared during scan");
                continue;
            }
            Err(e) => {
                errors.push((entry_path, e.to_string()));
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        match creation_time(&entry_path, &meta) {
            Ok(created) => observations.push(FileObservation {
                created,
                path: entry_path,
            }),
            Err(e) => errors.push((entry_path, e.to_string())),
        }
    }

    Ok((observations, errors))
}

/// Birth time where the platform records one, otherwise the last
/// modification time.
fn creation_time(path: &Path, meta: &std::fs::Metadata) -> io::Result<DateTime<Utc>> {
    match meta.created() {
        Ok(created) => Ok(created.into()),
        Err(e) if e.kind() == io::ErrorKind::Unsupported => {
            debug!(path = %path.display(), "creation time unavailable, using mtime");
            Ok(meta.modified()?.into())
        }
        Err(e) => Err(e),
    }
}
