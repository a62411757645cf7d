use anyhow::{anyhow, Result};
use axum::extract::multipart::Field;
use futures_util::StreamExt;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

/// Streams one multipart field to `dest`, creating parent directories
/// on the way. A partial file never survives a failed stream.
pub async fn stream_to_disk(mut field: Field<'_>, dest: &Path) -> Result<u64> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    if !content_type.starts_with("video/") {
        return Err(anyhow!("Invalid content type: only video/* allowed"));
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow!("Failed to prepare upload directory: {}", e))?;
    }

    let mut file = File::create(dest)
        .await
        .map_err(|e| anyhow!("Failed to create {}: {}", dest.display(), e))?;
    let mut written: u64 = 0;

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                error!("Stream error: {}", e);
                drop(file);
                let _ = fs::remove_file(dest).await;
                return Err(anyhow!("Stream interrupted"));
            }
        };

        if let Err(e) = file.write_all(&chunk).await {
            error!("Write error: {}", e);
            drop(file);
            let _ = fs::remove_file(dest).await;
            return Err(anyhow!("Failed to write upload: {}", e));
        }

        written += chunk.len() as u64;
    }

    file.flush().await?;
    info!("📦 Stored upload at {} ({} bytes)", dest.display(), written);
    Ok(written)
}
