use crate::modules::conversion::quality::Quality;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub mod ffmpeg;
pub mod probe;

/// Callback the encoder drives with whole percentages as it advances.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    pub job_id: Uuid,
    pub source: PathBuf,
    pub output: PathBuf,
    pub quality: Quality,
}

/// What a finished rendition looks like on disk.
#[derive(Debug, Clone)]
pub struct RenditionOutput {
    pub path: PathBuf,
    pub file_size: i64,
    pub duration_secs: f64,
    pub bitrate: i64,
    pub codec: String,
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("source file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("could not probe media: {0}")]
    Probe(String),

    #[error("encoder failed ({status}): {stderr}")]
    Encoder { status: String, stderr: String },

    #[error("transcode cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Encode capability behind the conversion pipeline. Implementations
/// watch the token and stop promptly when it fires, reporting
/// `Cancelled` instead of a synthetic failure.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(
        &self,
        request: TranscodeRequest,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<RenditionOutput, TranscodeError>;
}
