use super::artifacts::{ArtifactStore, NewRendition};
use super::error::ConversionError;
use super::model::{ConversionJob, JobStatus};
use super::quality::Quality;
use super::registry::JobRegistry;
use crate::infrastructure::transcode::{
    ProgressFn, TranscodeError, TranscodeRequest, Transcoder,
};
use dashmap::DashMap;
use futures_util::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenditionOutcome {
    Done,
    Failed,
    Cancelled,
}

struct RenditionContext {
    registry: Arc<JobRegistry>,
    transcoder: Arc<dyn Transcoder>,
    artifacts: Arc<dyn ArtifactStore>,
    pool: Arc<Semaphore>,
    token: CancellationToken,
    job_id: Uuid,
    movie_id: Uuid,
    source: PathBuf,
    output: PathBuf,
    quality: Quality,
}

/// Runs conversions end to end: validates the request, fans rendition
/// tasks out over a bounded pool, applies the fail-fast and
/// cancellation policy and settles the job in the registry.
pub struct ConversionOrchestrator {
    registry: Arc<JobRegistry>,
    transcoder: Arc<dyn Transcoder>,
    artifacts: Arc<dyn ArtifactStore>,
    pool: Arc<Semaphore>,
    tokens: Arc<DashMap<Uuid, CancellationToken>>,
    media_root: PathBuf,
    cancel_grace: Duration,
}

impl ConversionOrchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        transcoder: Arc<dyn Transcoder>,
        artifacts: Arc<dyn ArtifactStore>,
        workers: usize,
        media_root: PathBuf,
        cancel_grace: Duration,
    ) -> Self {
        Self {
            registry,
            transcoder,
            artifacts,
            pool: Arc::new(Semaphore::new(workers.max(1))),
            tokens: Arc::new(DashMap::new()),
            media_root,
            cancel_grace,
        }
    }

    /// Validates and schedules a conversion, returning the job id as
    /// soon as the rendition tasks are handed off. Progress is polled
    /// separately.
    pub async fn start(
        &self,
        movie_id: Uuid,
        source_path: &str,
        quality_labels: &[String],
    ) -> Result<Uuid, ConversionError> {
        if quality_labels.is_empty() {
            return Err(ConversionError::InvalidRequest(
                "at least one target quality is required".to_string(),
            ));
        }

        let mut qualities = Vec::with_capacity(quality_labels.len());
        for label in quality_labels {
            let quality = Quality::parse(label).ok_or_else(|| {
                ConversionError::InvalidRequest(format!("unknown quality '{label}'"))
            })?;
            if !qualities.contains(&quality) {
                qualities.push(quality);
            }
        }

        let source = PathBuf::from(source_path);
        match tokio::fs::metadata(&source).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                return Err(ConversionError::InvalidRequest(format!(
                    "source file not found: {source_path}"
                )));
            }
        }

        let job = self.registry.create(movie_id, source.clone(), &qualities)?;
        let token = CancellationToken::new();
        self.tokens.insert(job.id, token.clone());

        // A cancel can squeeze in between create and here. When it does
        // the job is already settled and nothing gets dispatched.
        if let Err(e) = self
            .registry
            .transition(job.id, JobStatus::Processing, None)
        {
            warn!("Job {} cancelled before scheduling: {}", job.id, e);
            self.tokens.remove(&job.id);
            return Ok(job.id);
        }

        info!(
            "Conversion {} started for movie {} ({} renditions)",
            job.id,
            movie_id,
            qualities.len()
        );

        let handles: Vec<JoinHandle<RenditionOutcome>> = qualities
            .iter()
            .map(|quality| {
                let ctx = RenditionContext {
                    registry: self.registry.clone(),
                    transcoder: self.transcoder.clone(),
                    artifacts: self.artifacts.clone(),
                    pool: self.pool.clone(),
                    token: token.clone(),
                    job_id: job.id,
                    movie_id,
                    source: source.clone(),
                    output: self.rendition_path(movie_id, *quality),
                    quality: *quality,
                };
                tokio::spawn(Self::run_rendition(ctx))
            })
            .collect();

        tokio::spawn(Self::supervise(
            self.registry.clone(),
            self.tokens.clone(),
            token,
            job.id,
            handles,
            self.cancel_grace,
        ));

        Ok(job.id)
    }

    pub fn find_job(&self, job_id: Uuid) -> Result<ConversionJob, ConversionError> {
        self.registry.get(job_id)
    }

    pub fn list_jobs(&self, movie_id: Option<Uuid>) -> Vec<ConversionJob> {
        self.registry.list(movie_id)
    }

    /// Cancels a job. Safe to call repeatedly: once the job is in a
    /// final state the stored status is reported back unchanged, and a
    /// cancelled job never turns into a completed one afterwards.
    pub fn cancel(&self, job_id: Uuid) -> Result<ConversionJob, ConversionError> {
        match self.registry.transition(job_id, JobStatus::Cancelled, None) {
            Ok(job) => {
                if let Some(token) = self.tokens.get(&job_id) {
                    token.cancel();
                }
                info!("Conversion {} cancelled", job_id);
                Ok(job)
            }
            Err(ConversionError::InvalidTransition { .. }) => self.registry.get(job_id),
            Err(e) => Err(e),
        }
    }

    fn rendition_path(&self, movie_id: Uuid, quality: Quality) -> PathBuf {
        self.media_root
            .join("movies")
            .join(movie_id.to_string())
            .join("renditions")
            .join(format!("{quality}.mp4"))
    }

    async fn run_rendition(ctx: RenditionContext) -> RenditionOutcome {
        // Queued renditions still react to cancel while waiting for a
        // pool slot.
        let _permit = tokio::select! {
            permit = ctx.pool.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return RenditionOutcome::Cancelled,
            },
            _ = ctx.token.cancelled() => return RenditionOutcome::Cancelled,
        };

        if ctx.token.is_cancelled() {
            return RenditionOutcome::Cancelled;
        }

        let progress: ProgressFn = {
            let registry = ctx.registry.clone();
            let job_id = ctx.job_id;
            let quality = ctx.quality;
            Arc::new(move |percent| {
                // The registry rejects writes against settled jobs,
                // late encoder output just falls on the floor.
                let _ = registry.update_progress(job_id, quality, percent);
            })
        };

        let request = TranscodeRequest {
            job_id: ctx.job_id,
            source: ctx.source.clone(),
            output: ctx.output.clone(),
            quality: ctx.quality,
        };

        match ctx
            .transcoder
            .transcode(request, progress, ctx.token.clone())
            .await
        {
            Ok(output) => {
                let rendition = NewRendition {
                    movie_id: ctx.movie_id,
                    quality: ctx.quality,
                    file_path: output.path.to_string_lossy().into_owned(),
                    file_size: output.file_size,
                    duration_secs: output.duration_secs,
                    bitrate: output.bitrate,
                    codec: output.codec,
                };
                if let Err(e) = ctx.artifacts.save_rendition(rendition).await {
                    Self::fail_job(&ctx, &ConversionError::Persist(e.to_string()).to_string());
                    return RenditionOutcome::Failed;
                }

                let _ = ctx.registry.complete_rendition(ctx.job_id, ctx.quality);
                info!("Rendition {} of job {} ready", ctx.quality, ctx.job_id);
                RenditionOutcome::Done
            }
            // Whoever fired the token has already settled the job.
            Err(TranscodeError::Cancelled) => RenditionOutcome::Cancelled,
            Err(e) => {
                Self::fail_job(&ctx, &e.to_string());
                RenditionOutcome::Failed
            }
        }
    }

    /// First hard failure wins: it settles the job and pulls every
    /// sibling down with it. Losers of that race leave the record alone.
    fn fail_job(ctx: &RenditionContext, message: &str) {
        if ctx
            .registry
            .transition(ctx.job_id, JobStatus::Failed, Some(message.to_string()))
            .is_ok()
        {
            error!(
                "Rendition {} of job {} failed: {}",
                ctx.quality, ctx.job_id, message
            );
            ctx.token.cancel();
        }
    }

    async fn supervise(
        registry: Arc<JobRegistry>,
        tokens: Arc<DashMap<Uuid, CancellationToken>>,
        token: CancellationToken,
        job_id: Uuid,
        handles: Vec<JoinHandle<RenditionOutcome>>,
        cancel_grace: Duration,
    ) {
        let all = join_all(handles);
        tokio::pin!(all);

        let outcomes = tokio::select! {
            outcomes = &mut all => Some(outcomes),
            _ = token.cancelled() => {
                // Grace period for tasks to wind down. Whatever is
                // still running afterwards keeps running detached, its
                // result is discarded.
                match timeout(cancel_grace, &mut all).await {
                    Ok(outcomes) => Some(outcomes),
                    Err(_) => None,
                }
            }
        };

        match outcomes {
            Some(results) => {
                let mut all_done = true;
                for result in results {
                    match result {
                        Ok(RenditionOutcome::Done) => {}
                        Ok(_) => all_done = false,
                        Err(e) => {
                            all_done = false;
                            error!("Rendition task of job {} aborted: {}", job_id, e);
                            let _ = registry.transition(
                                job_id,
                                JobStatus::Failed,
                                Some(format!("rendition task aborted: {e}")),
                            );
                        }
                    }
                }

                if all_done {
                    // A cancel racing the last rendition wins; the
                    // rejected transition keeps the job cancelled.
                    if registry.transition(job_id, JobStatus::Completed, None).is_ok() {
                        info!("Conversion {} completed", job_id);
                    }
                }
            }
            None => {
                warn!(
                    "Conversion {} tasks ignored cancellation, detaching",
                    job_id
                );
            }
        }

        tokens.remove(&job_id);
    }
}
