use super::artifacts::{sort_by_quality_desc, ArtifactStore, NewRendition, RenditionRecord};
use super::model::ConversionJob;
use super::orchestrator::ConversionOrchestrator;
use super::quality::Quality;
use super::registry::JobRegistry;
use crate::infrastructure::transcode::{
    ProgressFn, RenditionOutput, TranscodeError, TranscodeRequest, Transcoder,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Scripted behavior for one rendition of the mock encoder.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Emit the given percentages with a short pause between each,
    /// then succeed.
    Succeed { steps: Vec<u8> },
    /// Emit `percent`, wait, then report a hard encoder failure.
    Fail {
        percent: u8,
        wait: Duration,
        message: String,
    },
    /// Park until the token fires, then report cancellation.
    BlockUntilCancelled,
    /// Pretend not to see the token at all.
    IgnoreCancel,
}

pub(crate) struct MockTranscoder {
    scripts: Mutex<HashMap<Quality, Script>>,
    running: AtomicUsize,
    peak_running: AtomicUsize,
    step_delay: Duration,
}

impl MockTranscoder {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            running: AtomicUsize::new(0),
            peak_running: AtomicUsize::new(0),
            step_delay: Duration::from_millis(5),
        }
    }

    pub fn script(&self, quality: Quality, script: Script) {
        self.scripts.lock().unwrap().insert(quality, script);
    }

    pub fn peak_running(&self) -> usize {
        self.peak_running.load(Ordering::SeqCst)
    }

    async fn run_script(
        &self,
        script: Script,
        request: &TranscodeRequest,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<RenditionOutput, TranscodeError> {
        match script {
            Script::Succeed { steps } => {
                for step in steps {
                    progress(step);
                    tokio::time::sleep(self.step_delay).await;
                    if cancel.is_cancelled() {
                        return Err(TranscodeError::Cancelled);
                    }
                }
                Ok(RenditionOutput {
                    path: request.output.clone(),
                    file_size: 1024,
                    duration_secs: 60.0,
                    bitrate: 800_000,
                    codec: "h264".to_string(),
                })
            }
            Script::Fail {
                percent,
                wait,
                message,
            } => {
                progress(percent);
                tokio::time::sleep(wait).await;
                Err(TranscodeError::Encoder {
                    status: "exit status: 1".to_string(),
                    stderr: message,
                })
            }
            Script::BlockUntilCancelled => {
                cancel.cancelled().await;
                Err(TranscodeError::Cancelled)
            }
            Script::IgnoreCancel => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(TranscodeError::Cancelled)
            }
        }
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    async fn transcode(
        &self,
        request: TranscodeRequest,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<RenditionOutput, TranscodeError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&request.quality)
            .cloned()
            .unwrap_or(Script::Succeed {
                steps: vec![30, 60, 100],
            });

        let now_running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_running.fetch_max(now_running, Ordering::SeqCst);

        let result = self.run_script(script, &request, progress, cancel).await;

        self.running.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// In-memory stand-in for the Postgres store.
#[derive(Default)]
pub(crate) struct MemoryArtifactStore {
    records: tokio::sync::Mutex<Vec<RenditionRecord>>,
    reject_saves: AtomicBool,
}

impl MemoryArtifactStore {
    pub fn fail_saves(&self) {
        self.reject_saves.store(true, Ordering::SeqCst);
    }

    pub async fn saved(&self) -> Vec<RenditionRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn save_rendition(&self, rendition: NewRendition) -> Result<RenditionRecord> {
        if self.reject_saves.load(Ordering::SeqCst) {
            return Err(anyhow!("artifact store rejected the write"));
        }

        let record = RenditionRecord {
            id: Uuid::new_v4(),
            movie_id: rendition.movie_id,
            quality: rendition.quality.as_str().to_string(),
            file_path: rendition.file_path,
            file_size: rendition.file_size,
            duration_secs: rendition.duration_secs,
            bitrate: rendition.bitrate,
            codec: rendition.codec,
            created_at: OffsetDateTime::now_utc(),
        };

        let mut records = self.records.lock().await;
        records.retain(|r| !(r.movie_id == record.movie_id && r.quality == record.quality));
        records.push(record.clone());
        Ok(record)
    }

    async fn renditions_for_movie(&self, movie_id: Uuid) -> Result<Vec<RenditionRecord>> {
        let mut records: Vec<RenditionRecord> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect();
        sort_by_quality_desc(&mut records);
        Ok(records)
    }

    async fn find_rendition(
        &self,
        movie_id: Uuid,
        quality: Quality,
    ) -> Result<Option<RenditionRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.movie_id == movie_id && r.quality == quality.as_str())
            .cloned())
    }
}

pub(crate) struct TestRig {
    pub registry: Arc<JobRegistry>,
    pub artifacts: Arc<MemoryArtifactStore>,
    pub transcoder: Arc<MockTranscoder>,
    pub orchestrator: Arc<ConversionOrchestrator>,
    pub media: tempfile::TempDir,
    pub source: PathBuf,
}

impl TestRig {
    pub fn source_str(&self) -> String {
        self.source.to_string_lossy().into_owned()
    }
}

/// Orchestrator wired to the mock encoder and the in-memory store,
/// with a real source file on disk and a short cancellation grace.
pub(crate) async fn rig(workers: usize) -> TestRig {
    let media = tempfile::tempdir().unwrap();
    let source = media.path().join("source.mp4");
    tokio::fs::write(&source, b"not really a video").await.unwrap();

    let registry = Arc::new(JobRegistry::new(time::Duration::hours(1)));
    let artifacts = Arc::new(MemoryArtifactStore::default());
    let transcoder = Arc::new(MockTranscoder::new());

    let orchestrator = Arc::new(ConversionOrchestrator::new(
        registry.clone(),
        transcoder.clone(),
        artifacts.clone(),
        workers,
        media.path().to_path_buf(),
        Duration::from_millis(250),
    ));

    TestRig {
        registry,
        artifacts,
        transcoder,
        orchestrator,
        media,
        source,
    }
}

/// Polls until the job reaches a final state.
pub(crate) async fn wait_terminal(registry: &JobRegistry, job_id: Uuid) -> ConversionJob {
    for _ in 0..400 {
        let job = registry.get(job_id).unwrap();
        if job.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("job {job_id} did not reach a final state in time");
}
