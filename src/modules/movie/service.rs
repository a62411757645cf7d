use super::dto::{CreateMovieRequest, MovieResponse, RenditionResponse};
use super::error::MovieError;
use super::model::Movie;
use super::repository::MovieRepository;
use crate::modules::conversion::artifacts::RenditionRecord;
use crate::modules::conversion::quality::Quality;
use crate::state::AppState;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct MovieService;

impl MovieService {
    pub async fn create(
        state: AppState,
        req: CreateMovieRequest,
    ) -> Result<MovieResponse, MovieError> {
        let movie = MovieRepository::create(
            &state.db,
            &req.title,
            &req.slug,
            req.description.as_deref(),
        )
        .await?;

        Ok(movie.into())
    }

    pub async fn find_all(state: AppState) -> Result<Vec<MovieResponse>, MovieError> {
        let movies = MovieRepository::find_all(&state.db).await?;
        Ok(movies.into_iter().map(Into::into).collect())
    }

    pub async fn find_by_id(state: AppState, id: Uuid) -> Result<MovieResponse, MovieError> {
        let movie = MovieRepository::find_by_id(&state.db, id)
            .await?
            .ok_or(MovieError::NotFound(id))?;

        Ok(movie.into())
    }

    pub async fn delete(state: AppState, id: Uuid) -> Result<(), MovieError> {
        if MovieRepository::delete(&state.db, id).await? {
            Ok(())
        } else {
            Err(MovieError::NotFound(id))
        }
    }

    pub async fn ensure_exists(state: &AppState, id: Uuid) -> Result<(), MovieError> {
        MovieRepository::find_by_id(&state.db, id)
            .await?
            .map(|_| ())
            .ok_or(MovieError::NotFound(id))
    }

    pub async fn attach_source(
        state: AppState,
        id: Uuid,
        source_path: &str,
    ) -> Result<Movie, MovieError> {
        MovieRepository::set_source_path(&state.db, id, source_path)
            .await?
            .ok_or(MovieError::NotFound(id))
    }

    pub async fn renditions(
        state: AppState,
        id: Uuid,
    ) -> Result<Vec<RenditionResponse>, MovieError> {
        MovieRepository::find_by_id(&state.db, id)
            .await?
            .ok_or(MovieError::NotFound(id))?;

        let records = state.artifacts.renditions_for_movie(id).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Rendition picked for playback. Without an explicit quality the
    /// highest finished one wins.
    pub async fn rendition_for_playback(
        state: AppState,
        id: Uuid,
        quality: Option<Quality>,
    ) -> Result<Option<RenditionRecord>, MovieError> {
        let record = match quality {
            Some(q) => state.artifacts.find_rendition(id, q).await?,
            None => state
                .artifacts
                .renditions_for_movie(id)
                .await?
                .into_iter()
                .next(),
        };

        Ok(record)
    }

    /// Where an uploaded master lands on disk. The original container
    /// extension is kept so ffprobe sees the right format.
    pub fn source_destination(media_root: &Path, movie_id: Uuid, file_name: &str) -> PathBuf {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");

        media_root
            .join("movies")
            .join(movie_id.to_string())
            .join(format!("source.{extension}"))
    }
}
