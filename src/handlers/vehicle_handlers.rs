//! HTTP handlers for vehicle CRUD.
//! Turn extractor rejections into 422s, delegate to `VehicleService`, and map
//! absent records to 404.

use crate::{
    errors::AppError,
    models::vehicle::{Vehicle, VehicleCreate},
    services::vehicle_service::{ListVehiclesParams, VehicleService},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;

const NOT_FOUND: &str = "Vehicle not found";

/// Query params accepted by `GET /vehicle`.
#[derive(Debug, Deserialize)]
pub struct ListVehiclesQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

/// GET `/vehicle`: list vehicles, supports ?skip=&limit=
pub async fn list_vehicles(
    State(service): State<VehicleService>,
    query: Result<Query<ListVehiclesQuery>, QueryRejection>,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let Query(q) = query.map_err(|rejection| AppError::unprocessable(rejection.body_text()))?;

    let vehicles = service
        .list_vehicles(ListVehiclesParams {
            skip: q.skip,
            limit: q.limit,
        })
        .await?;
    Ok(Json(vehicles))
}

/// POST `/vehicle`: create a vehicle, generating its VIN when none is given.
pub async fn create_vehicle(
    State(service): State<VehicleService>,
    payload: Result<Json<VehicleCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Vehicle>), AppError> {
    let Json(draft) = payload.map_err(json_rejection)?;
    let vehicle = service.create_vehicle(draft).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// GET `/vehicle/{vin}`
pub async fn get_vehicle(
    State(service): State<VehicleService>,
    Path(vin): Path<String>,
) -> Result<Json<Vehicle>, AppError> {
    service
        .get_vehicle(&vin)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// PUT `/vehicle/{vin}`: overwrite every field except the VIN.
pub async fn update_vehicle(
    State(service): State<VehicleService>,
    Path(vin): Path<String>,
    payload: Result<Json<VehicleCreate>, JsonRejection>,
) -> Result<Json<Vehicle>, AppError> {
    let Json(draft) = payload.map_err(json_rejection)?;
    service
        .update_vehicle(&vin, draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// DELETE `/vehicle/{vin}`
pub async fn delete_vehicle(
    State(service): State<VehicleService>,
    Path(vin): Path<String>,
) -> Result<StatusCode, AppError> {
    if service.delete_vehicle(&vin).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(NOT_FOUND))
    }
}

/// Keep axum's status for body rejections (422 for missing or mistyped
/// fields, 400 for broken JSON, 415 for a missing content type).
fn json_rejection(rejection: JsonRejection) -> AppError {
    AppError::new(rejection.status(), rejection.body_text())
}
