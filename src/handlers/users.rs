use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::{ApiJson, ApiQuery};
use crate::{
    AppState,
    auth::{AuthUser, hash_password, issue_token, verify_password},
    error::AppError,
    models::{
        AuthResponse, AuthenticatedUser, LoginRequest, MessageResponse, NewUser,
        RegisterUserRequest, Role, UpdateUserRequest, User, UserChanges, UserList, UserResponse,
        UsersResponse,
    },
    validation::{check_required_fields, clean, normalize_email, parse_body, required_fields_for},
};

/// UserFilter
///
/// Query parameters of GET /api/users.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    /// Role to list. Required; a blank value counts as missing.
    #[param(value_type = Option<Role>)]
    pub role: Option<String>,
    /// When true, return only `{ _id, name }` pairs for dropdowns.
    pub list: Option<bool>,
}

/// register_user
///
/// [Public Route] Creates a user after the role-conditional required-field check, then
/// signs them in by returning a session token. Any role may self-register, admins
/// included, unless `ALLOW_ADMIN_REGISTRATION=false`.
#[utoipa::path(
    post,
    path = "/api/users/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Admin self-registration disabled"),
        (status = 409, description = "Duplicate email or identifier")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let role = body.get("role").and_then(Value::as_str);
    check_required_fields(&body, &required_fields_for(role))?;

    let mut req: RegisterUserRequest = parse_body(body)?;
    if req.role == Role::Admin && !state.config.allow_admin_registration {
        return Err(AppError::Forbidden(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }
    req.name = req.name.trim().to_string();
    req.email = normalize_email(&req.email);
    req.validate()?;

    let password_hash = hash_password(req.password, state.config.bcrypt_cost).await?;
    let new_user = NewUser {
        name: req.name,
        email: req.email,
        password_hash,
        role: req.role,
        gender: req.gender,
        roll_no: clean(req.roll_no),
        cnic: clean(req.cnic),
        phone_number: clean(req.phone_number),
        guardian_contact: clean(req.guardian_contact),
        address: clean(req.address),
        age: req.age,
        city: clean(req.city),
        licence: clean(req.licence),
        police_clearance: req.police_clearance,
        cnic_image: clean(req.cnic_image),
        id_image: clean(req.id_image),
    };

    let user = state.repo.create_user(new_user).await?;
    let token = issue_token(&user, &state.config)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: AuthenticatedUser { user, token },
        }),
    ))
}

/// login_user
///
/// [Public Route] Exchanges email and password for a session token.
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "Unknown email")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (Some(email), Some(password)) = (clean(req.email), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let user = state
        .repo
        .find_user_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid email and password".to_string()))?;

    if !verify_password(password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "login rejected: wrong password");
        return Err(AppError::Unauthorized(
            "Invalid email and password".to_string(),
        ));
    }

    let token = issue_token(&user, &state.config)?;
    Ok(Json(AuthResponse {
        message: "User login successfully".to_string(),
        user: AuthenticatedUser { user, token },
    }))
}

/// get_me
///
/// [Authenticated Route] The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses((status = 200, description = "Profile", body = UserResponse))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = find_user(&state, id).await?;
    Ok(Json(UserResponse {
        message: "Profile fetched successfully".to_string(),
        user,
    }))
}

/// get_all_users
///
/// [Admin Route] Lists users of one role, optionally as a dropdown list.
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilter),
    responses(
        (status = 200, description = "Users of the role", body = UsersResponse),
        (status = 400, description = "Role missing"),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_all_users(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> Result<Json<UsersResponse>, AppError> {
    auth.require_admin()?;
    let role = clean(filter.role)
        .ok_or_else(|| AppError::Validation("Role is required to get users".to_string()))?;
    let role: Role = parse_body(Value::String(role))?;

    let users = if filter.list.unwrap_or(false) {
        UserList::Options(state.repo.list_user_options(role).await?)
    } else {
        UserList::Full(state.repo.list_users(role).await?)
    };

    Ok(Json(UsersResponse {
        message: format!("{role} fetched successfully"),
        users,
    }))
}

/// get_user_by_id
///
/// [Admin Route]
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = UserResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    auth.require_admin()?;
    let user = find_user(&state, id).await?;
    Ok(Json(UserResponse {
        message: "User fetched successfully".to_string(),
        user,
    }))
}

/// update_user
///
/// [Admin Route] Partial update. A new password is validated and re-hashed. A driver
/// still assigned to a bus cannot be given another role (409).
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserResponse),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Duplicate identifier, or role change of an assigned driver")
    )
)]
pub async fn update_user(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(mut req): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth.require_admin()?;
    req.email = clean(req.email).map(|e| normalize_email(&e));
    req.validate()?;

    // Buses may only reference drivers.
    if req.role.is_some_and(|role| role != Role::Driver) && state.repo.driver_has_bus(id).await? {
        return Err(AppError::Conflict(
            "User is assigned to a bus and must remain a driver".to_string(),
        ));
    }

    let password_hash = match req.password {
        Some(password) => Some(hash_password(password, state.config.bcrypt_cost).await?),
        None => None,
    };

    let changes = UserChanges {
        name: clean(req.name),
        email: req.email,
        password_hash,
        role: req.role,
        gender: req.gender,
        roll_no: clean(req.roll_no),
        cnic: clean(req.cnic),
        phone_number: clean(req.phone_number),
        guardian_contact: clean(req.guardian_contact),
        address: clean(req.address),
        age: req.age,
        city: clean(req.city),
        licence: clean(req.licence),
        police_clearance: req.police_clearance,
        cnic_image: clean(req.cnic_image),
        id_image: clean(req.id_image),
    };

    let user = state
        .repo
        .update_user(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    tracing::info!(user_id = %id, admin_id = %auth.id, "user updated");

    Ok(Json(UserResponse {
        message: "User updated successfully".to_string(),
        user,
    }))
}

/// delete_user_by_id
///
/// [Admin Route] A driver still assigned to a bus cannot be deleted (409).
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Still referenced by a bus")
    )
)]
pub async fn delete_user_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_admin()?;
    if !state.repo.delete_user(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    tracing::info!(user_id = %id, admin_id = %auth.id, "user deleted");

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

async fn find_user(state: &AppState, id: Uuid) -> Result<User, AppError> {
    state
        .repo
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
