//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use voxrelay_core::models;
use voxrelay_services::ResourceStats;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Voxrelay API",
        version = "0.1.0",
        description = "Audio and video transcription relay. Uploads are staged on a public file host, transcribed through an external subtitle API, and the result is pushed to a chat webhook."
    ),
    paths(
        handlers::transcribe::transcribe_upload,
        handlers::stats::get_stats,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::TranscribeResponse,
            ResourceStats,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "transcriptions", description = "Upload audio or video and receive the transcript"),
        (name = "system", description = "Health and resource usage")
    )
)]
pub struct ApiDoc;
