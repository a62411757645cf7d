use super::dto::{
    CancelConversionResponse, ConversionStartedResponse, ConversionStatusResponse,
    ConversionSummaryResponse, StartConversionRequest,
};
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListConversionsQuery {
    pub movie_id: Option<Uuid>,
}

/// Start a conversion
#[utoipa::path(
    post,
    path = "/api/v1/conversions",
    request_body = StartConversionRequest,
    responses(
        (status = 201, description = "Conversion accepted", body = ApiResponse<ConversionStartedResponse>),
        (status = 400, description = "Bad Request")
    ),
    tag = "Conversion"
)]
pub async fn start_conversion(
    State(state): State<AppState>,
    Json(payload): Json<StartConversionRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return ApiError(e.to_string(), StatusCode::BAD_REQUEST).into_response();
    }

    match state
        .orchestrator
        .start(payload.movie_id, &payload.source_path, &payload.qualities)
        .await
    {
        Ok(job_id) => ApiSuccess(
            ApiResponse::success(
                ConversionStartedResponse { job_id },
                "Conversion started successfully",
            ),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List conversions
#[utoipa::path(
    get,
    path = "/api/v1/conversions",
    params(ListConversionsQuery),
    responses(
        (status = 200, description = "List of conversions", body = ApiResponse<Vec<ConversionSummaryResponse>>)
    ),
    tag = "Conversion"
)]
pub async fn list_conversions(
    State(state): State<AppState>,
    Query(query): Query<ListConversionsQuery>,
) -> impl IntoResponse {
    let summaries: Vec<ConversionSummaryResponse> = state
        .orchestrator
        .list_jobs(query.movie_id)
        .iter()
        .map(ConversionSummaryResponse::from)
        .collect();

    ApiSuccess(
        ApiResponse::success(summaries, "Conversions retrieved successfully"),
        StatusCode::OK,
    )
    .into_response()
}

/// Get conversion status
#[utoipa::path(
    get,
    path = "/api/v1/conversions/{id}",
    params(
        ("id" = Uuid, Path, description = "Conversion job ID")
    ),
    responses(
        (status = 200, description = "Conversion status", body = ApiResponse<ConversionStatusResponse>),
        (status = 404, description = "Conversion not found")
    ),
    tag = "Conversion"
)]
pub async fn get_conversion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.orchestrator.find_job(id) {
        Ok(job) => ApiSuccess(
            ApiResponse::success(
                ConversionStatusResponse::from(&job),
                "Conversion retrieved successfully",
            ),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Cancel a conversion
#[utoipa::path(
    post,
    path = "/api/v1/conversions/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Conversion job ID")
    ),
    responses(
        (status = 200, description = "Conversion cancelled", body = ApiResponse<CancelConversionResponse>),
        (status = 404, description = "Conversion not found")
    ),
    tag = "Conversion"
)]
pub async fn cancel_conversion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.orchestrator.cancel(id) {
        Ok(job) => ApiSuccess(
            ApiResponse::success(
                CancelConversionResponse::from(&job),
                "Conversion cancelled successfully",
            ),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}
