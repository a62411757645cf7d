use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::model::{ConversionJob, JobStatus};
use super::progress::ProgressAggregator;
use super::quality::Quality;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartConversionRequest {
    pub movie_id: Uuid,
    #[validate(length(min = 1, message = "Source path is required"))]
    pub source_path: String,
    #[validate(length(min = 1, message = "At least one target quality is required"))]
    pub qualities: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStartedResponse {
    pub job_id: Uuid,
}

/// Full poll payload for one job. `completed`/`failed` are convenience
/// flags derived from `status`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStatusResponse {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: BTreeMap<Quality, u8>,
    pub completed: bool,
    pub failed: bool,
    pub error: Option<String>,
    #[serde(with = "time::serde::iso8601")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::iso8601")]
    pub last_update: OffsetDateTime,
    pub movie_id: Uuid,
    pub qualities: Vec<Quality>,
}

impl From<&ConversionJob> for ConversionStatusResponse {
    fn from(job: &ConversionJob) -> Self {
        Self {
            id: job.id,
            status: job.status,
            progress: job.progress.clone(),
            completed: job.status == JobStatus::Completed,
            failed: job.status == JobStatus::Failed,
            error: job.error.clone(),
            start_time: job.start_time,
            last_update: job.last_update,
            movie_id: job.movie_id,
            qualities: job.qualities.clone(),
        }
    }
}

/// Compact listing row: per-rendition detail rolled up into one percent.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummaryResponse {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub status: JobStatus,
    pub progress: f64,
    pub done: bool,
}

impl From<&ConversionJob> for ConversionSummaryResponse {
    fn from(job: &ConversionJob) -> Self {
        Self {
            id: job.id,
            movie_id: job.movie_id,
            status: job.status,
            progress: ProgressAggregator::overall(job),
            done: ProgressAggregator::is_done(job),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelConversionResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

impl From<&ConversionJob> for CancelConversionResponse {
    fn from(job: &ConversionJob) -> Self {
        Self {
            job_id: job.id,
            status: job.status,
        }
    }
}
