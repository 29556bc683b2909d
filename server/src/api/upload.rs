//! Back-office image upload.
//!
//! - POST /api/admin/upload - Multipart `file` field; returns `{url}`

use crate::state::AppState;
use crate::uploads::MAX_IMAGE_BYTES;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
};
use booking_web::{AppError, RequireAdmin};
use serde::Serialize;

/// Where the stored image can be fetched.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public URL of the stored file
    pub url: String,
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::new(e.status(), e.body_text(), "INVALID_UPLOAD")
}

/// Store the `file` part of a multipart body as a vehicle image.
///
/// # Errors
///
/// 400 when the part is missing, not `image/*` or over 5 MB; 500 when the
/// file cannot be written.
pub async fn upload_image(
    RequireAdmin(session): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        if !field
            .content_type()
            .is_some_and(|content_type| content_type.starts_with("image/"))
        {
            return Err(AppError::bad_request("File must be an image"));
        }
        let original_name = field.file_name().unwrap_or_default().to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(AppError::bad_request("File size must be less than 5MB"));
            }
            bytes.extend_from_slice(&chunk);
        }

        let url = state
            .uploads
            .save_vehicle_image(&original_name, &bytes)
            .await
            .map_err(|e| AppError::internal("Failed to upload file").with_source(e))?;
        tracing::info!(user = %session.username, %url, "vehicle image uploaded");
        return Ok(Json(UploadResponse { url }));
    }

    Err(AppError::bad_request("No file provided"))
}
