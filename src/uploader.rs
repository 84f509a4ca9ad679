use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use glob::{MatchOptions, Pattern};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::UploadError;
use crate::storage::Storage;

const LOGS_ROOT: &str = "Logs";

// Shell glob semantics: `*.csv` does not pick up `.hidden.csv`.
const REPORT_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct FileReport {
    pub local_path: PathBuf,
    pub destination: String,
    pub result: Result<u64, UploadError>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub enum DailyUploadReport {
    /// Nothing in the reports directory matched the pattern.
    NoFiles { reports_dir: PathBuf, pattern: String },
    Completed {
        date: NaiveDate,
        files: Vec<FileReport>,
    },
}

/// `Logs/YYYY/MM/DD`
pub fn destination_prefix(date: NaiveDate) -> String {
    format!("{}/{}", LOGS_ROOT, date.format("%Y/%m/%d"))
}

pub fn destination_for(date: NaiveDate, local_path: &Path) -> Result<String, UploadError> {
    let file_name = local_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| UploadError::InvalidPath {
            path: local_path.to_owned(),
        })?;
    Ok(format!("{}/{}", destination_prefix(date), file_name))
}

/// Everything an upload run needs, built once at startup.
pub struct UploadContext {
    storage: Arc<dyn Storage>,
    reports_dir: PathBuf,
    pattern: Pattern,
}

impl UploadContext {
    pub fn new(storage: Arc<dyn Storage>, reports_dir: PathBuf, pattern: Pattern) -> Self {
        UploadContext {
            storage,
            reports_dir,
            pattern,
        }
    }

    pub fn storage_location(&self) -> String {
        self.storage.location()
    }

    /// Uploads one file. Returns the number of bytes written.
    pub async fn upload_file(
        &self,
        local_path: &Path,
        destination: &str,
    ) -> Result<u64, UploadError> {
        let is_file = tokio::fs::metadata(local_path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(UploadError::NotFound {
                path: local_path.to_owned(),
            });
        }

        let data = tokio::fs::read(local_path)
            .await
            .map_err(|source| UploadError::Read {
                path: local_path.to_owned(),
                source,
            })?;
        let len = data.len() as u64;

        debug!("Uploading {} ({} bytes) to {}", local_path.display(), len, destination);
        self.storage
            .upload(destination, Bytes::from(data))
            .await
            .map_err(|e| UploadError::Storage {
                destination: destination.to_owned(),
                message: format!("{:#}", e),
            })?;

        Ok(len)
    }

    /// Regular files directly inside the reports directory whose name matches
    /// the pattern, sorted by name. An absent directory yields nothing.
    ///
    /// Names that are not valid UTF-8 are matched lossily and kept, so they
    /// surface as failed uploads instead of vanishing.
    pub fn discover_reports(&self) -> Vec<PathBuf> {
        if !self.reports_dir.is_dir() {
            warn!("Reports directory {} does not exist", self.reports_dir.display());
            return Vec::new();
        }

        let mut found = Vec::new();
        let walker = WalkDir::new(&self.reports_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.reports_dir.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if self.pattern.matches_with(&name, REPORT_MATCH_OPTIONS) {
                found.push(entry.into_path());
            }
        }
        found
    }

    /// Uploads every matching report to `Logs/YYYY/MM/DD/<file name>`.
    ///
    /// Files are handled one after another and a failure never stops the batch.
    pub async fn run_daily_upload(&self, date: NaiveDate) -> DailyUploadReport {
        let reports = self.discover_reports();
        if reports.is_empty() {
            return DailyUploadReport::NoFiles {
                reports_dir: self.reports_dir.clone(),
                pattern: self.pattern.as_str().to_owned(),
            };
        }

        info!(
            "Uploading {} report(s) to {}/{}",
            reports.len(),
            self.storage.location(),
            destination_prefix(date)
        );

        let mut files = Vec::with_capacity(reports.len());
        for local_path in reports {
            let report = match destination_for(date, &local_path) {
                Ok(destination) => {
                    let result = self.upload_file(&local_path, &destination).await;
                    FileReport {
                        local_path,
                        destination,
                        result,
                    }
                }
                Err(e) => FileReport {
                    local_path,
                    destination: destination_prefix(date),
                    result: Err(e),
                },
            };

            if let Err(e) = &report.result {
                warn!("{}", e);
            }
            files.push(report);
        }

        DailyUploadReport::Completed { date, files }
    }
}
