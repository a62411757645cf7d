use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::model::Movie;
use crate::modules::conversion::artifacts::RenditionRecord;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMovieRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Slug is required"))]
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovieResponse {
    pub movie: Movie,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self { movie }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSourceResponse {
    pub movie_id: Uuid,
    pub source_path: String,
    pub file_size: u64,
}

/// Artifact record as exposed to clients, one per finished rendition.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenditionResponse {
    pub movie_id: Uuid,
    pub quality: String,
    pub file_path: String,
    pub file_size: i64,
    #[serde(rename = "duration")]
    pub duration_secs: f64,
    pub bitrate: i64,
    pub codec: String,
}

impl From<RenditionRecord> for RenditionResponse {
    fn from(record: RenditionRecord) -> Self {
        Self {
            movie_id: record.movie_id,
            quality: record.quality,
            file_path: record.file_path,
            file_size: record.file_size,
            duration_secs: record.duration_secs,
            bitrate: record.bitrate,
            codec: record.codec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn rendition_payload_matches_the_artifact_record_shape() {
        let record = RenditionRecord {
            id: Uuid::new_v4(),
            movie_id: Uuid::new_v4(),
            quality: "720p".to_string(),
            file_path: "/media/movies/x/renditions/720p.mp4".to_string(),
            file_size: 1024,
            duration_secs: 93.5,
            bitrate: 2_500_000,
            codec: "h264".to_string(),
            created_at: OffsetDateTime::now_utc(),
        };

        let value = serde_json::to_value(RenditionResponse::from(record)).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "movieId", "quality", "filePath", "fileSize", "duration", "bitrate", "codec",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object.len(), 7);
        assert_eq!(value["duration"], 93.5);
    }

    #[test]
    fn upload_payload_uses_camel_case_keys() {
        let response = UploadSourceResponse {
            movie_id: Uuid::new_v4(),
            source_path: "/media/movies/x/source.mp4".to_string(),
            file_size: 2048,
        };

        let value = serde_json::to_value(response).unwrap();
        let object = value.as_object().unwrap();

        for key in ["movieId", "sourcePath", "fileSize"] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object.len(), 3);
    }
}
