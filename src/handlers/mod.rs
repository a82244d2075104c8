//! HTTP handlers, one module per resource. Each handler resolves the caller through the
//! `AuthUser` extractor where needed, talks to the repository through `AppState`, and
//! reports failures as `AppError`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

pub mod buses;
pub mod complaints;
pub mod uploads;
pub mod users;

/// ApiJson
///
/// `axum::Json` with its rejection mapped into `AppError`, so malformed bodies come back
/// as `400 {"error": ...}` like every other validation failure.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// ApiQuery
///
/// `axum::extract::Query` with the same rejection mapping as `ApiJson`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
