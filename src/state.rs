use crate::config::settings::AppConfig;
use crate::infrastructure::db::pool::DbPool;
use crate::infrastructure::transcode::ffmpeg::FfmpegTranscoder;
use crate::modules::conversion::artifacts::ArtifactStore;
use crate::modules::conversion::orchestrator::ConversionOrchestrator;
use crate::modules::conversion::registry::JobRegistry;
use crate::modules::conversion::repository::PgArtifactStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DbPool,
    pub registry: Arc<JobRegistry>,
    pub artifacts: Arc<dyn ArtifactStore>,
    pub orchestrator: Arc<ConversionOrchestrator>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let registry = Arc::new(JobRegistry::new(time::Duration::seconds(
            config.job_retention_secs as i64,
        )));
        let artifacts: Arc<dyn ArtifactStore> = Arc::new(PgArtifactStore::new(db.clone()));
        let transcoder = Arc::new(FfmpegTranscoder::new(
            config.ffmpeg_bin.clone(),
            config.ffprobe_bin.clone(),
        ));
        let orchestrator = Arc::new(ConversionOrchestrator::new(
            registry.clone(),
            transcoder,
            artifacts.clone(),
            config.encode_workers,
            config.media_root.clone(),
            Duration::from_secs(config.cancel_grace_secs),
        ));

        Self {
            config,
            db,
            registry,
            artifacts,
            orchestrator,
        }
    }
}
