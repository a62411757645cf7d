use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub mod artifacts;
pub mod dto;
pub mod error;
pub mod handler;
pub mod model;
pub mod orchestrator;
pub mod progress;
pub mod quality;
pub mod registry;
pub mod repository;

#[cfg(test)]
pub(crate) mod support;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handler::start_conversion).get(handler::list_conversions),
        )
        .route("/{id}", get(handler::get_conversion))
        .route("/{id}/cancel", post(handler::cancel_conversion))
}
