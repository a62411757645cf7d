use super::quality::Quality;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Legal forward moves. Terminal states accept none, and nothing
    /// ever returns to `Queued`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (*self, next),
            (Queued, Processing)
                | (Queued, Cancelled)
                | (Processing, Completed)
                | (Processing, Failed)
                | (Processing, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversion request tracked from creation to its final state.
/// Mutated only through the registry.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub source_path: PathBuf,
    pub qualities: Vec<Quality>,
    pub status: JobStatus,
    pub progress: BTreeMap<Quality, u8>,
    pub completed_renditions: BTreeSet<Quality>,
    pub error: Option<String>,
    pub start_time: OffsetDateTime,
    pub last_update: OffsetDateTime,
}

impl ConversionJob {
    pub fn new(movie_id: Uuid, source_path: PathBuf, qualities: Vec<Quality>) -> Self {
        let now = OffsetDateTime::now_utc();
        let progress = qualities.iter().map(|q| (*q, 0u8)).collect();

        Self {
            id: Uuid::new_v4(),
            movie_id,
            source_path,
            qualities,
            status: JobStatus::Queued,
            progress,
            completed_renditions: BTreeSet::new(),
            error: None,
            start_time: now,
            last_update: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
