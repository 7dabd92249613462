use std::path::Path as FsPath;

use axum::{Json, extract::Multipart};
use uuid::Uuid;

use crate::{
    config,
    dto::books::UploadedImage,
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    policy::{self, Action},
    response::{ApiResponse, Meta},
};

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Accepts a multipart `file` field, stores it under the upload directory
/// and answers with the URL the static file layer serves it at.
#[utoipa::path(
    post,
    path = "/api/books/upload-image",
    responses(
        (status = 200, description = "Image stored", body = ApiResponse<UploadedImage>),
        (status = 400, description = "Missing file, bad extension or over 5MB"),
        (status = 403, description = "Caller is not a merchant"),
    ),
    security(("bearer_auth" = [])),
    tag = "Books"
)]
pub async fn upload_image(
    caller: AuthMember,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadedImage>>> {
    policy::ensure(&caller, Action::UploadImage, None)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let extension = FsPath::new(&original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| {
                AppError::BadRequest(
                    "Only image files are allowed (jpg, jpeg, png, gif, webp)".into(),
                )
            })?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::BadRequest(
                "Only image files are allowed (jpg, jpeg, png, gif, webp)".into(),
            ));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        if data.len() > MAX_IMAGE_BYTES {
            return Err(AppError::BadRequest("Image exceeds the 5MB limit".into()));
        }

        let filename = format!("book-{}.{extension}", Uuid::new_v4());
        let dir = format!("{}/books", config::upload_dir());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        tokio::fs::write(format!("{dir}/{filename}"), &data)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

        let uploaded = UploadedImage {
            url: format!("/uploads/books/{filename}"),
            filename,
            size: data.len() as u64,
        };

        return Ok(Json(ApiResponse::success(
            "Image uploaded",
            uploaded,
            Some(Meta::empty()),
        )));
    }

    Err(AppError::BadRequest("No file field in upload".into()))
}
