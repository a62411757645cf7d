use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_movie).get(handler::list_movies))
        .route(
            "/{id}",
            get(handler::get_movie).delete(handler::delete_movie),
        )
        .route("/{id}/upload", post(handler::upload_source))
        .route("/{id}/renditions", get(handler::list_renditions))
        .route("/{id}/stream", get(handler::stream_movie))
}
