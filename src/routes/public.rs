use crate::{AppState, handlers::users};
use axum::{Router, routing::post};

/// Public Router Module
///
/// Unauthenticated endpoints, mounted under `/api`. Everything else needs a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /api/users/register
        // Role-conditional sign-up; returns the user with a session token.
        .route("/users/register", post(users::register_user))
        // POST /api/users/login
        .route("/users/login", post(users::login_user))
}
