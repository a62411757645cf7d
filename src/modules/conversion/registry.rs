use super::error::ConversionError;
use super::model::{ConversionJob, JobStatus};
use super::quality::Quality;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

struct JobEntry {
    seq: u64,
    job: ConversionJob,
}

/// Process-wide store of conversion jobs and the only place their state
/// changes. The map's shard locks serialize writes to the same job while
/// leaving unrelated jobs free. Everything lives in memory; a restart
/// forgets unfinished jobs, completed rendition metadata survives in the
/// artifact store.
pub struct JobRegistry {
    jobs: DashMap<Uuid, JobEntry>,
    seq: AtomicU64,
    retention: Duration,
}

impl JobRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: DashMap::new(),
            seq: AtomicU64::new(0),
            retention,
        }
    }

    /// Creates a job in `Queued` state. Duplicate qualities collapse,
    /// keeping the order of first appearance.
    pub fn create(
        &self,
        movie_id: Uuid,
        source_path: PathBuf,
        qualities: &[Quality],
    ) -> Result<ConversionJob, ConversionError> {
        if qualities.is_empty() {
            return Err(ConversionError::InvalidRequest(
                "at least one target quality is required".to_string(),
            ));
        }

        let mut unique = Vec::with_capacity(qualities.len());
        for quality in qualities {
            if !unique.contains(quality) {
                unique.push(*quality);
            }
        }

        let job = ConversionJob::new(movie_id, source_path, unique);
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.jobs.insert(job.id, JobEntry { seq, job: job.clone() });

        Ok(job)
    }

    pub fn get(&self, job_id: Uuid) -> Result<ConversionJob, ConversionError> {
        self.jobs
            .get(&job_id)
            .map(|entry| entry.job.clone())
            .ok_or(ConversionError::NotFound(job_id))
    }

    /// Records encoder progress for one rendition. Percentages are
    /// capped at 100 and never move backwards. Writes against a
    /// finished job are rejected, not applied.
    pub fn update_progress(
        &self,
        job_id: Uuid,
        quality: Quality,
        percent: u8,
    ) -> Result<(), ConversionError> {
        let mut entry = self
            .jobs
            .get_mut(&job_id)
            .ok_or(ConversionError::NotFound(job_id))?;
        let job = &mut entry.job;

        if job.status.is_terminal() {
            return Err(ConversionError::InvalidTransition {
                from: job.status,
                to: JobStatus::Processing,
            });
        }

        let slot = job.progress.get_mut(&quality).ok_or_else(|| {
            ConversionError::InvalidRequest(format!(
                "quality {quality} was not requested for this job"
            ))
        })?;

        *slot = percent.min(100).max(*slot);
        job.last_update = OffsetDateTime::now_utc();
        Ok(())
    }

    /// Marks one rendition finished, which also pins its progress at 100.
    pub fn complete_rendition(
        &self,
        job_id: Uuid,
        quality: Quality,
    ) -> Result<(), ConversionError> {
        let mut entry = self
            .jobs
            .get_mut(&job_id)
            .ok_or(ConversionError::NotFound(job_id))?;
        let job = &mut entry.job;

        if job.status.is_terminal() {
            return Err(ConversionError::InvalidTransition {
                from: job.status,
                to: JobStatus::Processing,
            });
        }
        if !job.qualities.contains(&quality) {
            return Err(ConversionError::InvalidRequest(format!(
                "quality {quality} was not requested for this job"
            )));
        }

        job.progress.insert(quality, 100);
        job.completed_renditions.insert(quality);
        job.last_update = OffsetDateTime::now_utc();
        Ok(())
    }

    /// Moves a job to `next` under the lifecycle rules. `Completed`
    /// additionally requires every requested rendition to be recorded
    /// as finished. The error text is stored only on failure.
    pub fn transition(
        &self,
        job_id: Uuid,
        next: JobStatus,
        error: Option<String>,
    ) -> Result<ConversionJob, ConversionError> {
        let mut entry = self
            .jobs
            .get_mut(&job_id)
            .ok_or(ConversionError::NotFound(job_id))?;
        let job = &mut entry.job;

        if !job.status.can_transition_to(next) {
            return Err(ConversionError::InvalidTransition {
                from: job.status,
                to: next,
            });
        }
        if next == JobStatus::Completed && job.completed_renditions.len() != job.qualities.len() {
            return Err(ConversionError::InvalidTransition {
                from: job.status,
                to: next,
            });
        }

        job.status = next;
        job.error = if next == JobStatus::Failed {
            Some(error.unwrap_or_else(|| "transcode failed".to_string()))
        } else {
            None
        };
        job.last_update = OffsetDateTime::now_utc();

        Ok(job.clone())
    }

    /// Jobs in creation order, optionally narrowed to one movie.
    pub fn list(&self, movie_id: Option<Uuid>) -> Vec<ConversionJob> {
        let mut rows: Vec<(u64, ConversionJob)> = self
            .jobs
            .iter()
            .filter(|entry| movie_id.is_none_or(|m| entry.job.movie_id == m))
            .map(|entry| (entry.seq, entry.job.clone()))
            .collect();

        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, job)| job).collect()
    }

    /// Drops finished jobs whose last transition is older than the
    /// retention window. Returns how many were removed.
    pub fn expire(&self, now: OffsetDateTime) -> usize {
        let before = self.jobs.len();
        self.jobs
            .retain(|_, entry| !(entry.job.is_terminal() && now - entry.job.last_update >= self.retention));
        before - self.jobs.len()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
