use super::artifacts::{sort_by_quality_desc, ArtifactStore, NewRendition, RenditionRecord};
use super::quality::Quality;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Postgres-backed rendition metadata. Re-running a conversion for the
/// same movie and quality replaces the previous row.
pub struct PgArtifactStore {
    pool: PgPool,
}

impl PgArtifactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtifactStore for PgArtifactStore {
    async fn save_rendition(&self, rendition: NewRendition) -> Result<RenditionRecord> {
        let record = sqlx::query_as::<_, RenditionRecord>(
            r#"
            INSERT INTO renditions (movie_id, quality, file_path, file_size, duration_secs, bitrate, codec)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (movie_id, quality) DO UPDATE SET
                file_path = EXCLUDED.file_path,
                file_size = EXCLUDED.file_size,
                duration_secs = EXCLUDED.duration_secs,
                bitrate = EXCLUDED.bitrate,
                codec = EXCLUDED.codec,
                created_at = NOW()
            RETURNING id, movie_id, quality, file_path, file_size, duration_secs, bitrate, codec, created_at
            "#,
        )
        .bind(rendition.movie_id)
        .bind(rendition.quality.as_str())
        .bind(&rendition.file_path)
        .bind(rendition.file_size)
        .bind(rendition.duration_secs)
        .bind(rendition.bitrate)
        .bind(&rendition.codec)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to save rendition: {}", e))?;

        Ok(record)
    }

    async fn renditions_for_movie(&self, movie_id: Uuid) -> Result<Vec<RenditionRecord>> {
        let mut records = sqlx::query_as::<_, RenditionRecord>(
            r#"
            SELECT id, movie_id, quality, file_path, file_size, duration_secs, bitrate, codec, created_at
            FROM renditions
            WHERE movie_id = $1
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch renditions: {}", e))?;

        sort_by_quality_desc(&mut records);
        Ok(records)
    }

    async fn find_rendition(
        &self,
        movie_id: Uuid,
        quality: Quality,
    ) -> Result<Option<RenditionRecord>> {
        let record = sqlx::query_as::<_, RenditionRecord>(
            r#"
            SELECT id, movie_id, quality, file_path, file_size, duration_secs, bitrate, codec, created_at
            FROM renditions
            WHERE movie_id = $1 AND quality = $2
            "#,
        )
        .bind(movie_id)
        .bind(quality.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch rendition: {}", e))?;

        Ok(record)
    }
}
