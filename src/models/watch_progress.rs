use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MediaKind;

/// Below this a title counts as barely started
pub const MIN_PROGRESS: f32 = 5.0;
/// Above this a title counts as finished
pub const MAX_PROGRESS: f32 = 95.0;

/// One entry of the browser-held "continue watching" list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchProgress {
    pub id: u64,
    #[serde(rename = "type", alias = "media_type")]
    pub media_type: MediaKind,
    /// Percentage watched, 0-100
    pub progress: f32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl WatchProgress {
    pub fn is_in_progress(&self) -> bool {
        self.progress > MIN_PROGRESS && self.progress < MAX_PROGRESS
    }
}

/// Entries that are neither barely started nor finished, newest first
pub fn in_progress(mut history: Vec<WatchProgress>) -> Vec<WatchProgress> {
    history.retain(WatchProgress::is_in_progress);
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    history
}
