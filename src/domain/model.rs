use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// One harvested review. Kept only when at least one field carries a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub rating: Option<u8>,
    pub text: String,
}

impl ReviewRecord {
    /// Builds a record, or `None` when neither field is usable.
    pub fn new(rating: Option<u8>, text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if rating.is_none() && text.trim().is_empty() {
            return None;
        }
        Some(Self { rating, text })
    }
}

/// Per-run loop state. Created for one invocation and dropped with it.
#[derive(Debug)]
pub struct HarvestSession {
    pub target_url: Url,
    pub records: Vec<ReviewRecord>,
    pub attempt_count: usize,
    pub last_extent: u64,
    pub items_seen: usize,
    pub skipped: usize,
}

impl HarvestSession {
    pub fn new(target_url: Url) -> Self {
        Self {
            target_url,
            records: Vec::new(),
            attempt_count: 0,
            last_extent: 0,
            items_seen: 0,
            skipped: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestStatus {
    /// Container stopped growing.
    Completed,
    AttemptCapReached,
    DeadlineExceeded,
    Cancelled,
    InvalidTarget,
    ContainerNotFound,
    SessionFailure,
}

impl HarvestStatus {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            HarvestStatus::InvalidTarget
                | HarvestStatus::ContainerNotFound
                | HarvestStatus::SessionFailure
        )
    }
}

impl fmt::Display for HarvestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HarvestStatus::Completed => "completed",
            HarvestStatus::AttemptCapReached => "attempt cap reached",
            HarvestStatus::DeadlineExceeded => "deadline exceeded",
            HarvestStatus::Cancelled => "cancelled",
            HarvestStatus::InvalidTarget => "invalid target",
            HarvestStatus::ContainerNotFound => "container not found",
            HarvestStatus::SessionFailure => "session failure",
        };
        f.write_str(label)
    }
}

/// Result of one harvest. Always produced, even on failure.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    pub records: Vec<ReviewRecord>,
    pub status: HarvestStatus,
    pub message: String,
    pub scroll_attempts: usize,
    pub items_seen: usize,
    pub skipped: usize,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl HarvestReport {
    pub fn failed(status: HarvestStatus, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            records: Vec::new(),
            status,
            message: message.into(),
            scroll_attempts: 0,
            items_seen: 0,
            skipped: 0,
            elapsed,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percent: u8,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unsupported format '{}', expected csv or json", other)),
        }
    }
}

/// Rendered export files, ready to hand to a `Storage`.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub files: Vec<ExportFile>,
    pub record_count: usize,
}

#[derive(Debug, Clone)]
pub struct ExportFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// What the engine hands back to the front ends.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub status: HarvestStatus,
    pub message: String,
    pub record_count: usize,
    pub output_paths: Vec<String>,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_requires_rating_or_text() {
        assert!(ReviewRecord::new(None, "").is_none());
        assert!(ReviewRecord::new(None, "   ").is_none());
        assert_eq!(
            ReviewRecord::new(Some(3), ""),
            Some(ReviewRecord {
                rating: Some(3),
                text: String::new()
            })
        );
        assert!(ReviewRecord::new(None, "ok").is_some());
    }

    #[test]
    fn test_failure_statuses() {
        assert!(HarvestStatus::ContainerNotFound.is_failure());
        assert!(HarvestStatus::SessionFailure.is_failure());
        assert!(HarvestStatus::InvalidTarget.is_failure());
        assert!(!HarvestStatus::Completed.is_failure());
        assert!(!HarvestStatus::Cancelled.is_failure());
    }
}
