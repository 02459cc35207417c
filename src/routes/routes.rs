//! Defines routes for the vehicle record store.
//!
//! ## Structure
//! - **Collection endpoints**
//!   - `GET    /vehicle`: list vehicles (supports skip, limit)
//!   - `POST   /vehicle`: create vehicle
//!
//! - **Record endpoints**
//!   - `GET    /vehicle/{vin}`: fetch one vehicle
//!   - `PUT    /vehicle/{vin}`: overwrite a vehicle
//!   - `DELETE /vehicle/{vin}`: delete a vehicle

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        vehicle_handlers::{
            create_vehicle, delete_vehicle, get_vehicle, list_vehicles, update_vehicle,
        },
    },
    services::vehicle_service::VehicleService,
};
use axum::{Router, routing::get};

/// Build and return the router for all vehicle routes.
///
/// The router carries shared state (`VehicleService`) to all handlers.
pub fn routes() -> Router<VehicleService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Record-level routes
        .route(
            "/vehicle/{vin}",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        // Collection-level routes
        .route("/vehicle", get(list_vehicles).post(create_vehicle))
}

/// Router with state attached, ready to serve.
pub fn app(service: VehicleService) -> Router {
    routes().with_state(service)
}
