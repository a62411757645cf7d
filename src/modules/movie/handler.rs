use super::dto::{CreateMovieRequest, MovieResponse, RenditionResponse, UploadSourceResponse};
use super::service::MovieService;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::common::upload::stream_to_disk;
use crate::modules::conversion::quality::Quality;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::{headers::Range, TypedHeader};
use axum_range::{KnownSize, Ranged};
use serde::Deserialize;
use tokio::fs::File;
use tracing::{error, info};
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StreamQuery {
    pub quality: Option<String>,
}

/// Create a movie
#[utoipa::path(
    post,
    path = "/api/v1/movies",
    request_body = CreateMovieRequest,
    responses(
        (status = 201, description = "Movie created", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Bad Request")
    ),
    tag = "Content"
)]
pub async fn create_movie(
    State(state): State<AppState>,
    Json(req): Json<CreateMovieRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response();
    }

    match MovieService::create(state, req).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Movie created successfully"),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List movies
#[utoipa::path(
    get,
    path = "/api/v1/movies",
    responses(
        (status = 200, description = "List of movies", body = ApiResponse<Vec<MovieResponse>>)
    ),
    tag = "Content"
)]
pub async fn list_movies(State(state): State<AppState>) -> impl IntoResponse {
    match MovieService::find_all(state).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Movies retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get movie by ID
#[utoipa::path(
    get,
    path = "/api/v1/movies/{id}",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie details", body = ApiResponse<MovieResponse>),
        (status = 404, description = "Movie not found")
    ),
    tag = "Content"
)]
pub async fn get_movie(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match MovieService::find_by_id(state, id).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Movie retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete movie
#[utoipa::path(
    delete,
    path = "/api/v1/movies/{id}",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie deleted", body = ApiResponse<String>),
        (status = 404, description = "Movie not found")
    ),
    tag = "Content"
)]
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match MovieService::delete(state, id).await {
        Ok(_) => ApiSuccess(
            ApiResponse::success((), "Movie deleted successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Upload the master source file
/// Streamed to disk, never buffered in memory
#[utoipa::path(
    post,
    path = "/api/v1/movies/{id}/upload",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Upload successful", body = ApiResponse<UploadSourceResponse>),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Movie not found")
    ),
    tag = "Content"
)]
pub async fn upload_source(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    if let Err(e) = MovieService::ensure_exists(&state, id).await {
        return e.into_response();
    }

    while let Some(field) = multipart.next_field().await.unwrap_or(None) {
        let name = field.name().unwrap_or("").to_string();

        if name == "video" {
            let file_name = field.file_name().unwrap_or("video.mp4").to_string();
            info!("Starting upload for movie {}: {}", id, file_name);

            let dest = MovieService::source_destination(&state.config.media_root, id, &file_name);

            match stream_to_disk(field, &dest).await {
                Ok(file_size) => {
                    let source_path = dest.to_string_lossy().into_owned();
                    if let Err(e) =
                        MovieService::attach_source(state.clone(), id, &source_path).await
                    {
                        return e.into_response();
                    }

                    return ApiSuccess(
                        ApiResponse::success(
                            UploadSourceResponse {
                                movie_id: id,
                                source_path,
                                file_size,
                            },
                            "Source uploaded successfully",
                        ),
                        StatusCode::OK,
                    )
                    .into_response();
                }
                Err(e) => {
                    return ApiError(format!("Upload failed: {}", e), StatusCode::BAD_REQUEST)
                        .into_response();
                }
            }
        }
    }

    ApiError(
        "No video field found in multipart request".to_string(),
        StatusCode::BAD_REQUEST,
    )
    .into_response()
}

/// List finished renditions
#[utoipa::path(
    get,
    path = "/api/v1/movies/{id}/renditions",
    params(
        ("id" = Uuid, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Renditions, highest quality first", body = ApiResponse<Vec<RenditionResponse>>),
        (status = 404, description = "Movie not found")
    ),
    tag = "Content"
)]
pub async fn list_renditions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match MovieService::renditions(state, id).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Renditions retrieved successfully"),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Stream a rendition with Range support
#[utoipa::path(
    get,
    path = "/api/v1/movies/{id}/stream",
    params(
        ("id" = Uuid, Path, description = "Movie ID"),
        StreamQuery
    ),
    responses(
        (status = 200, description = "Stream content"),
        (status = 206, description = "Partial content"),
        (status = 404, description = "No rendition available")
    ),
    tag = "Content"
)]
pub async fn stream_movie(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StreamQuery>,
    range: Option<TypedHeader<Range>>,
) -> impl IntoResponse {
    let quality = match query.quality {
        Some(label) => match Quality::parse(&label) {
            Some(q) => Some(q),
            None => {
                return ApiError(format!("Unknown quality '{}'", label), StatusCode::BAD_REQUEST)
                    .into_response();
            }
        },
        None => None,
    };

    let record = match MovieService::rendition_for_playback(state, id, quality).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return ApiError("No rendition available".to_string(), StatusCode::NOT_FOUND)
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    let file = match File::open(&record.file_path).await {
        Ok(file) => file,
        Err(e) => {
            error!("Rendition file missing at {}: {}", record.file_path, e);
            return ApiError("Rendition file missing".to_string(), StatusCode::NOT_FOUND)
                .into_response();
        }
    };

    let body = match KnownSize::file(file).await {
        Ok(body) => body,
        Err(e) => return ApiError(e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response(),
    };

    let mime = mime_guess::from_path(&record.file_path).first_or_octet_stream();
    let range = range.map(|TypedHeader(range)| range);

    (
        [(header::CONTENT_TYPE, mime.to_string())],
        Ranged::new(range, body),
    )
        .into_response()
}
