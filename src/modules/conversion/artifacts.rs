use super::quality::Quality;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A completed rendition as persisted.
#[derive(Debug, Clone, FromRow)]
pub struct RenditionRecord {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub quality: String,
    pub file_path: String,
    pub file_size: i64,
    pub duration_secs: f64,
    pub bitrate: i64,
    pub codec: String,
    pub created_at: OffsetDateTime,
}

/// Metadata for a rendition that just finished encoding.
#[derive(Debug, Clone)]
pub struct NewRendition {
    pub movie_id: Uuid,
    pub quality: Quality,
    pub file_path: String,
    pub file_size: i64,
    pub duration_secs: f64,
    pub bitrate: i64,
    pub codec: String,
}

/// Durable home for rendition metadata. The conversion pipeline only
/// talks to this trait; Postgres backs it in production.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn save_rendition(&self, rendition: NewRendition) -> Result<RenditionRecord>;

    /// All renditions of a movie, highest quality first.
    async fn renditions_for_movie(&self, movie_id: Uuid) -> Result<Vec<RenditionRecord>>;

    async fn find_rendition(
        &self,
        movie_id: Uuid,
        quality: Quality,
    ) -> Result<Option<RenditionRecord>>;
}

/// Highest ladder rung first. Labels that are not on the ladder sink to
/// the end rather than failing the listing.
pub fn sort_by_quality_desc(records: &mut [RenditionRecord]) {
    records.sort_by_key(|record| {
        std::cmp::Reverse(Quality::parse(&record.quality).map(|q| q.height()).unwrap_or(0))
    });
}
