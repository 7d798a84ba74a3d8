use crate::config::upload::UploadConfig;
use crate::error::{AppError, AppResult};
use crate::response::ApiResponse;
use crate::services::upload::UploadService;
use axum::{extract::Multipart, response::IntoResponse, Extension};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Publicly fetchable URL of the stored image
    pub url: String,
}

/// Upload a post photo.
/// POST /upload/image (multipart form: field "file")
#[utoipa::path(
    post,
    path = "/api/v1/upload/image",
    request_body(content_type = "multipart/form-data", description = "Image in field `file`, at most 4 MiB"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Not an image", body = AppError),
        (status = 413, description = "Image too large", body = AppError),
    ),
    tag = "uploads"
)]
pub async fn upload_image(
    Extension(config): Extension<UploadConfig>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let filename = field.file_name().unwrap_or("image").to_string();

        let data = field.bytes().await.map_err(|e| {
            if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge
            } else {
                AppError::Validation(format!("Failed to read file data: {}", e))
            }
        })?;

        let url = UploadService::save_image(&config, &data, &content_type, &filename).await?;
        return Ok(ApiResponse::ok(UploadResponse { url }));
    }

    Err(AppError::Validation("No file provided".to_string()))
}
