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
        BusResponse, BusesResponse, CreateBusRequest, MessageResponse, Role, UpdateBusRequest,
    },
    validation::{BUS_FIELDS, check_required_fields, clean, ensure_role, parse_body},
};

/// create_bus
///
/// [Admin Route] Registers a bus and assigns its driver. The driver must exist and hold
/// the driver role.
#[utoipa::path(
    post,
    path = "/api/buses",
    request_body = CreateBusRequest,
    responses(
        (status = 201, description = "Created", body = BusResponse),
        (status = 400, description = "Missing field or invalid driver"),
        (status = 409, description = "Duplicate bus number")
    )
)]
pub async fn create_bus(
    auth: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<BusResponse>), AppError> {
    auth.require_admin()?;
    check_required_fields(&body, BUS_FIELDS)?;

    let mut req: CreateBusRequest = parse_body(body)?;
    req.bus_number = req.bus_number.trim().to_string();
    ensure_driver(&state, req.driver_id).await?;

    let bus = state.repo.create_bus(req).await?;
    tracing::info!(bus_id = %bus.id, bus_number = %bus.bus_number, "bus created");

    Ok((
        StatusCode::CREATED,
        Json(BusResponse {
            message: Some("Bus created successfully".to_string()),
            bus,
        }),
    ))
}

/// get_all_buses
///
/// [Admin Route] Every bus with `driverName` populated.
#[utoipa::path(
    get,
    path = "/api/buses",
    responses((status = 200, description = "All buses", body = BusesResponse))
)]
pub async fn get_all_buses(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BusesResponse>, AppError> {
    auth.require_admin()?;
    let buses = state.repo.list_buses().await?;
    Ok(Json(BusesResponse { buses }))
}

#[utoipa::path(
    get,
    path = "/api/buses/{id}",
    params(("id" = Uuid, Path, description = "Bus ID")),
    responses(
        (status = 200, description = "Found", body = BusResponse),
        (status = 404, description = "Bus not found")
    )
)]
pub async fn get_bus_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BusResponse>, AppError> {
    auth.require_admin()?;
    let bus = state.repo.get_bus(id).await?.ok_or_else(bus_not_found)?;
    Ok(Json(BusResponse { message: None, bus }))
}

/// update_bus
///
/// [Admin Route] Partial update; a new driver goes through the same check as on create.
#[utoipa::path(
    put,
    path = "/api/buses/{id}",
    params(("id" = Uuid, Path, description = "Bus ID")),
    request_body = UpdateBusRequest,
    responses(
        (status = 200, description = "Updated", body = BusResponse),
        (status = 404, description = "Bus not found")
    )
)]
pub async fn update_bus(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(mut req): ApiJson<UpdateBusRequest>,
) -> Result<Json<BusResponse>, AppError> {
    auth.require_admin()?;
    req.bus_number = clean(req.bus_number);
    if let Some(driver_id) = req.driver_id {
        ensure_driver(&state, driver_id).await?;
    }

    let bus = state
        .repo
        .update_bus(id, req)
        .await?
        .ok_or_else(bus_not_found)?;

    Ok(Json(BusResponse {
        message: Some("Bus updated successfully".to_string()),
        bus,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/buses/{id}",
    params(("id" = Uuid, Path, description = "Bus ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Bus not found")
    )
)]
pub async fn delete_bus(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_admin()?;
    if !state.repo.delete_bus(id).await? {
        return Err(bus_not_found());
    }
    tracing::info!(bus_id = %id, "bus deleted");

    Ok(Json(MessageResponse {
        message: "Bus deleted successfully".to_string(),
    }))
}

async fn ensure_driver(state: &AppState, driver_id: Uuid) -> Result<(), AppError> {
    let driver = state.repo.find_user_by_id(driver_id).await?.ok_or_else(|| {
        AppError::Validation("driverId must reference an existing driver".to_string())
    })?;
    ensure_role(driver.role, Role::Driver, "driverId")
}

fn bus_not_found() -> AppError {
    AppError::NotFound("Bus not found".to_string())
}
