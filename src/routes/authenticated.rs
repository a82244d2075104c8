use crate::{
    AppState,
    handlers::{complaints, uploads, users},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Endpoints for any signed-in user (student, driver or admin), mounted under `/api`.
/// The router is wrapped in the `auth_middleware` route layer, and each handler also takes
/// `AuthUser` to scope what it returns to the caller.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/users/me
        .route("/users/me", get(users::get_me))
        // POST /api/uploads/presigned
        // Signed PUT URL for CNIC / ID card images.
        .route("/uploads/presigned", post(uploads::get_presigned_url))
        // POST/GET /api/complaints
        // Filing is open to every role; listing is scoped to the caller unless admin.
        .route(
            "/complaints",
            post(complaints::create_complaint).get(complaints::get_all_complaints),
        )
        // GET /api/complaints/{id}
        .route("/complaints/{id}", get(complaints::get_complaint_by_id))
}
