//! Upload-and-transcribe endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use uuid::Uuid;

use voxrelay_core::{AppError, FileMetadata, MediaKind, NotificationMeta, TranscribeResponse};
use voxrelay_services::format_notification;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

#[utoipa::path(
    post,
    path = "/api/v0/transcriptions",
    tag = "transcriptions",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcription finished", body = TranscribeResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
        (status = 502, description = "Hosting or transcription upstream failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "transcribe_upload"))]
pub async fn transcribe_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, HttpAppError> {
    let _guard = state.monitor.begin_processing();

    let (data, original_filename) = extract_multipart_file(multipart).await?;

    // Extension decides the pipeline before anything touches the disk
    let kind = state.validator.classify(&original_filename)?;
    state.validator.validate_size(data.len())?;

    let metadata = FileMetadata::new(data.len() as u64, &original_filename);
    let stored_path = store_upload(&state, &data, &metadata).await?;
    let mut temp_paths = vec![stored_path.clone()];

    tracing::info!(
        filename = %original_filename,
        size_mb = metadata.size_mb,
        kind = ?kind,
        "Upload accepted"
    );

    let audio_path = match kind {
        MediaKind::Audio => stored_path.clone(),
        MediaKind::Video => match state.extractor.extract_audio(&stored_path).await {
            Ok(extracted) => {
                temp_paths.push(extracted.clone());
                extracted
            }
            Err(e) => {
                remove_temp_files(&temp_paths).await;
                return Err(e.into());
            }
        },
    };

    let outcome = state.transcriber.transcribe(&audio_path).await;

    // Uploads and extracted audio never outlive the request
    remove_temp_files(&temp_paths).await;

    let transcript = outcome?;

    let notification = format_notification(
        &transcript.text,
        &NotificationMeta {
            duration_minutes: Some(transcript.duration_minutes),
            file_size_mb: Some(metadata.size_mb),
            file_type: Some(metadata.extension.clone()),
        },
    );
    let notified = state.notifier.send(&notification).await;

    tracing::info!(
        filename = %original_filename,
        duration_minutes = transcript.duration_minutes,
        notified,
        "Transcription request complete"
    );

    Ok(Json(TranscribeResponse {
        success: true,
        text: transcript.text,
        duration: transcript.duration_minutes,
        file_size: metadata.size_mb,
        file_type: metadata.extension,
        notified,
    }))
}

/// Writes the upload under a fresh name so concurrent requests never collide.
async fn store_upload(
    state: &AppState,
    data: &[u8],
    metadata: &FileMetadata,
) -> Result<PathBuf, AppError> {
    let stored_path = state
        .config
        .upload_dir
        .join(format!("{}.{}", Uuid::new_v4(), metadata.extension));

    tokio::fs::write(&stored_path, data).await?;

    Ok(stored_path)
}

async fn remove_temp_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove temporary file"
            );
        }
    }
}
