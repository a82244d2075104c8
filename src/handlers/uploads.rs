use axum::{Json, extract::State};

use super::ApiJson;
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    models::{PresignedUrlRequest, PresignedUrlResponse},
    storage::{ALLOWED_IMAGE_TYPES, object_key_for},
};

/// get_presigned_url
///
/// [Authenticated Route] Signs a short-lived URL the dashboard uses to PUT a CNIC or ID
/// card image straight into object storage. The returned `resourceKey` is then saved on
/// the user as `cnicImage` / `idImage`.
#[utoipa::path(
    post,
    path = "/api/uploads/presigned",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "URL", body = PresignedUrlResponse),
        (status = 400, description = "Not an allowed image type")
    )
)]
pub async fn get_presigned_url(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PresignedUrlRequest>,
) -> Result<Json<PresignedUrlResponse>, AppError> {
    let file_type = payload.file_type.trim().to_ascii_lowercase();
    if !ALLOWED_IMAGE_TYPES.contains(&file_type.as_str()) {
        return Err(AppError::Validation(
            "Only JPG, JPEG, PNG, and WEBP images are allowed.".to_string(),
        ));
    }

    let object_key = object_key_for(id, &payload.filename);
    let upload_url = state
        .storage
        .get_presigned_upload_url(&object_key, &file_type)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(PresignedUrlResponse {
        upload_url,
        resource_key: object_key,
    }))
}
