//! Image upload.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use futures::StreamExt;

use quill_core::domain::UploadedImage;
use quill_shared::dto::UploadResponse;

use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

fn multipart_error(err: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart body: {}", err))
}

/// Read a field into memory, failing as soon as it grows past the upload limit.
async fn read_field(field: &mut Field) -> AppResult<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(multipart_error)?;
        UploadedImage::check_size(bytes.len() + chunk.len())?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// POST /api/v1/upload
pub async fn upload_file(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut upload: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(multipart_error)?;

        if upload.is_none() && field.name() == Some(FILE_FIELD) {
            let original_name = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(String::from);
            let bytes = read_field(&mut field).await?;
            upload = Some((original_name, bytes));
        } else {
            // Drain anything else so the stream can advance.
            while let Some(chunk) = field.next().await {
                chunk.map_err(multipart_error)?;
            }
        }
    }

    let (original_name, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let image = UploadedImage::inspect(original_name.as_deref(), &bytes)?;
    let stored = state.media.save(&image.filename, &bytes).await?;

    tracing::info!(
        user_id = %user.user_id,
        filename = %stored.filename,
        mime = image.media_type.mime(),
        size = bytes.len(),
        "File uploaded"
    );

    Ok(HttpResponse::Ok().json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        url: stored.url,
        filename: stored.filename,
    }))
}
