use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;
pub mod validation;

// Routing segregated by access level (public, authenticated, admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for the dashboard API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::users::register_user, handlers::users::login_user, handlers::users::get_me,
        handlers::users::get_all_users, handlers::users::get_user_by_id,
        handlers::users::update_user, handlers::users::delete_user_by_id,
        handlers::buses::create_bus, handlers::buses::get_all_buses,
        handlers::buses::get_bus_by_id, handlers::buses::update_bus, handlers::buses::delete_bus,
        handlers::complaints::create_complaint, handlers::complaints::get_all_complaints,
        handlers::complaints::get_complaint_by_id, handlers::complaints::update_complaint,
        handlers::complaints::delete_complaint, handlers::uploads::get_presigned_url,
    ),
    components(
        schemas(
            models::Role, models::Gender, models::PoliceClearance, models::BusStatus,
            models::ComplaintStatus, models::User, models::UserOption, models::UserRef,
            models::Bus, models::Complaint, models::ComplaintDetails,
            models::RegisterUserRequest, models::LoginRequest, models::UpdateUserRequest,
            models::CreateBusRequest, models::UpdateBusRequest, models::CreateComplaintRequest,
            models::UpdateComplaintRequest, models::PresignedUrlRequest,
            models::PresignedUrlResponse, models::MessageResponse, models::AuthenticatedUser,
            models::AuthResponse, models::UserResponse, models::UserList, models::UsersResponse,
            models::BusResponse, models::BusesResponse, models::ComplaintResponse,
            models::ComplaintDetailsResponse, models::ComplaintsResponse,
        )
    ),
    tags(
        (name = "transit-admin", description = "University transport management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared state handed to every handler: persistence, object storage and the
/// immutable configuration.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub storage: StorageState,
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Route layer for everything that needs a session. Extracting `AuthUser` runs the full
/// token check; on failure the extractor's 401 is returned and the handler never runs.
/// The resolved user is stored in the request extensions so handlers reuse it.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree under `/api`, the docs, and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.frontend_domain.as_deref());
    let x_request_id = HeaderName::from_static("x-request-id");

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .merge(
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        );

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// cors_layer
///
/// Only the dashboard origin may call the API when `FRONTEND_DOMAIN` is set; any origin
/// otherwise.
fn cors_layer(frontend_domain: Option<&str>) -> CorsLayer {
    let origin = match frontend_domain.and_then(|d| HeaderValue::from_str(d).ok()) {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(origin)
}

/// trace_span_logger
///
/// Span for each request, tagged with its `x-request-id` so all log lines of one request
/// correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
