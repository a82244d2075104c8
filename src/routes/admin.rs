use crate::{
    AppState,
    handlers::{buses, complaints, users},
};
use axum::{
    Router,
    routing::{get, put},
};

/// Admin Router Module
///
/// Dashboard management endpoints, mounted under `/api`. The router sits behind the
/// authentication layer; every handler additionally calls `AuthUser::require_admin`,
/// which answers `403` for students and drivers.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Users ---
        // GET /api/users?role=<role>[&list=true]
        .route("/users", get(users::get_all_users))
        .route(
            "/users/{id}",
            get(users::get_user_by_id)
                .put(users::update_user)
                .delete(users::delete_user_by_id),
        )
        // --- Buses ---
        .route("/buses", get(buses::get_all_buses).post(buses::create_bus))
        .route(
            "/buses/{id}",
            get(buses::get_bus_by_id)
                .put(buses::update_bus)
                .delete(buses::delete_bus),
        )
        // --- Complaint workflow ---
        // PUT/DELETE /api/complaints/{id}
        // Merged with the authenticated GET on the same path.
        .route(
            "/complaints/{id}",
            put(complaints::update_complaint).delete(complaints::delete_complaint),
        )
}
