use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;
use uuid::Uuid;

use super::ApiJson;
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    models::{
        ComplaintDetailsResponse, ComplaintResponse, ComplaintsResponse, CreateComplaintRequest,
        MessageResponse, NewComplaint, UpdateComplaintRequest,
    },
    validation::{COMPLAINT_FIELDS, check_required_fields, clean, parse_body},
};

/// create_complaint
///
/// [Authenticated Route] Files a complaint. The reporter is the caller unless an admin
/// files on someone's behalf via `userId`. New complaints start as `pending`.
#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Created", body = ComplaintResponse),
        (status = 400, description = "Missing field or unknown user reference"),
        (status = 403, description = "Filing for another user without the admin role")
    )
)]
pub async fn create_complaint(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ComplaintResponse>), AppError> {
    check_required_fields(&body, COMPLAINT_FIELDS)?;
    let req: CreateComplaintRequest = parse_body(body)?;

    let reporter = match req.user_id {
        Some(user_id) if user_id != auth.id => {
            auth.require_admin()?;
            ensure_user_exists(&state, user_id, "userId").await?;
            user_id
        }
        _ => auth.id,
    };
    if let Some(assignee) = req.assigned_to {
        ensure_user_exists(&state, assignee, "assignedTo").await?;
    }

    let complaint = state
        .repo
        .create_complaint(NewComplaint {
            user_id: reporter,
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            assigned_to: req.assigned_to,
        })
        .await?;
    tracing::info!(complaint_id = %complaint.id, reporter = %reporter, "complaint filed");

    Ok((
        StatusCode::CREATED,
        Json(ComplaintResponse {
            message: "Complaint created successfully".to_string(),
            complaint,
        }),
    ))
}

/// get_all_complaints
///
/// [Authenticated Route] Admins see every complaint; everyone else sees the ones they
/// filed. Reporter and assignee are populated.
#[utoipa::path(
    get,
    path = "/api/complaints",
    responses((status = 200, description = "Complaints", body = ComplaintsResponse))
)]
pub async fn get_all_complaints(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ComplaintsResponse>, AppError> {
    let reporter = if auth.is_admin() { None } else { Some(auth.id) };
    let complaints = state.repo.list_complaints(reporter).await?;
    Ok(Json(ComplaintsResponse { complaints }))
}

#[utoipa::path(
    get,
    path = "/api/complaints/{id}",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Found", body = ComplaintDetailsResponse),
        (status = 404, description = "Complaint not found")
    )
)]
pub async fn get_complaint_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ComplaintDetailsResponse>, AppError> {
    let complaint = state
        .repo
        .get_complaint(id)
        .await?
        // Someone else's complaint is reported as missing, not forbidden.
        .filter(|c| auth.is_admin() || c.user_id.as_ref().map(|r| r.id) == Some(auth.id))
        .ok_or_else(complaint_not_found)?;

    Ok(Json(ComplaintDetailsResponse { complaint }))
}

/// update_complaint
///
/// [Admin Route] Moves a complaint through its workflow or reassigns it. An explicit
/// `"assignedTo": null` unassigns.
#[utoipa::path(
    put,
    path = "/api/complaints/{id}",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateComplaintRequest,
    responses(
        (status = 200, description = "Updated", body = ComplaintResponse),
        (status = 404, description = "Complaint not found")
    )
)]
pub async fn update_complaint(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(mut req): ApiJson<UpdateComplaintRequest>,
) -> Result<Json<ComplaintResponse>, AppError> {
    auth.require_admin()?;
    req.title = clean(req.title);
    req.description = clean(req.description);
    if let Some(Some(assignee)) = req.assigned_to {
        ensure_user_exists(&state, assignee, "assignedTo").await?;
    }

    let complaint = state
        .repo
        .update_complaint(id, req)
        .await?
        .ok_or_else(complaint_not_found)?;
    tracing::info!(complaint_id = %id, status = ?complaint.status, "complaint updated");

    Ok(Json(ComplaintResponse {
        message: "Complaint updated successfully".to_string(),
        complaint,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/complaints/{id}",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Complaint not found")
    )
)]
pub async fn delete_complaint(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_admin()?;
    if !state.repo.delete_complaint(id).await? {
        return Err(complaint_not_found());
    }

    Ok(Json(MessageResponse {
        message: "Complaint deleted successfully".to_string(),
    }))
}

async fn ensure_user_exists(state: &AppState, id: Uuid, field: &str) -> Result<(), AppError> {
    match state.repo.find_user_by_id(id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Validation(format!(
            "{field} must reference an existing user"
        ))),
    }
}

fn complaint_not_found() -> AppError {
    AppError::NotFound("Complaint not found".to_string())
}
