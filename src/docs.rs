use utoipa::OpenApi;

use crate::modules::conversion::dto::*;
use crate::modules::conversion::model::JobStatus;
use crate::modules::conversion::quality::Quality;
use crate::modules::movie::dto::*;
use crate::modules::movie::model::Movie;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::movie::handler::create_movie,
        crate::modules::movie::handler::list_movies,
        crate::modules::movie::handler::get_movie,
        crate::modules::movie::handler::delete_movie,
        crate::modules::movie::handler::upload_source,
        crate::modules::movie::handler::list_renditions,
        crate::modules::movie::handler::stream_movie,
        crate::modules::conversion::handler::start_conversion,
        crate::modules::conversion::handler::list_conversions,
        crate::modules::conversion::handler::get_conversion,
        crate::modules::conversion::handler::cancel_conversion,
    ),
    components(
        schemas(
            Movie,
            CreateMovieRequest,
            MovieResponse,
            UploadSourceResponse,
            RenditionResponse,
            StartConversionRequest,
            ConversionStartedResponse,
            ConversionStatusResponse,
            ConversionSummaryResponse,
            CancelConversionResponse,
            JobStatus,
            Quality,
        )
    ),
    tags(
        (name = "Content", description = "Movie catalog and media files"),
        (name = "Conversion", description = "Transcoding job management")
    )
)]
pub struct ApiDoc;
