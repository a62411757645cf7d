use super::model::Movie;
use anyhow::{anyhow, Result};
use sqlx::PgPool;
use uuid::Uuid;

pub struct MovieRepository;

impl MovieRepository {
    pub async fn create(
        pool: &PgPool,
        title: &str,
        slug: &str,
        description: Option<&str>,
    ) -> Result<Movie> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description, source_path, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(slug)
        .bind(description)
        .fetch_one(pool)
        .await
        .map_err(|e| anyhow!("Failed to create movie: {}", e))?;

        Ok(movie)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, slug, description, source_path, created_at, updated_at
            FROM movies
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch movies: {}", e))?;

        Ok(movies)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, slug, description, source_path, created_at, updated_at
            FROM movies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch movie: {}", e))?;

        Ok(movie)
    }

    /// `None` when no row matched the id.
    pub async fn set_source_path(
        pool: &PgPool,
        id: Uuid,
        source_path: &str,
    ) -> Result<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            UPDATE movies
            SET source_path = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, title, slug, description, source_path, created_at, updated_at
            "#,
        )
        .bind(source_path)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| anyhow!("Failed to attach source to movie: {}", e))?;

        Ok(movie)
    }

    /// Whether a row was actually removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| anyhow!("Failed to delete movie: {}", e))?;

        Ok(result.rows_affected() > 0)
    }
}
