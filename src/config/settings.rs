use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub media_root: PathBuf,
    pub encode_workers: usize,
    pub job_retention_secs: u64,
    pub cancel_grace_secs: u64,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            server_port: env::get_parsed(EnvKey::ServerPort, 3000),
            database_url: env::get(EnvKey::DatabaseUrl)?,
            media_root: PathBuf::from(env::get_or(EnvKey::MediaRoot, "./media")),
            encode_workers: env::get_parsed(EnvKey::EncodeWorkers, default_workers()),
            job_retention_secs: env::get_parsed(EnvKey::JobRetentionSecs, 3600),
            cancel_grace_secs: env::get_parsed(EnvKey::CancelGraceSecs, 10),
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, "ffmpeg"),
            ffprobe_bin: env::get_or(EnvKey::FfprobeBin, "ffprobe"),
        })
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
}
