//! src/services/vehicle_service.rs
//!
//! VehicleService: CRUD over the `vehicles` table, keyed by VIN. Every
//! operation checks a connection out of the shared SQLite pool for its own
//! duration. Inserts are single autocommit statements so SQLite's busy
//! handler can queue concurrent writers instead of failing them.

use crate::{
    models::vehicle::{Vehicle, VehicleCreate},
    services::vin_codec,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationErrors};

/// Attempts made to find a free generated VIN before giving up.
pub const MAX_VIN_ATTEMPTS: usize = 5;
pub const DEFAULT_LIST_LIMIT: u32 = 100;

const VEHICLE_COLUMNS: &str = "vin, manufacturer_name, description, horse_power, model_name, \
     model_year, purchase_price, fuel_type, color, category";

#[derive(Clone, Copy, Debug, Default)]
pub struct ListVehiclesParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("invalid vehicle payload: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error("vehicle with VIN `{0}` already exists")]
    VinConflict(String),
    #[error("no free VIN found after {0} attempts")]
    VinSpaceExhausted(usize),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type VehicleResult<T> = Result<T, VehicleError>;

/// VehicleService provides the record store operations:
/// - Get a vehicle by VIN
/// - List vehicles a page at a time
/// - Create a vehicle (caller-supplied or generated VIN)
/// - Overwrite every mutable field of an existing vehicle
/// - Delete a vehicle
///
/// The pool is the only shared state. The primary key on `vin` is the only
/// uniqueness check: a taken VIN surfaces as a unique violation on insert.
#[derive(Clone)]
pub struct VehicleService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,

    vin_source: fn() -> String,
}

impl VehicleService {
    /// Create a new VehicleService backed by the provided SQLite pool.
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self {
            db,
            vin_source: vin_codec::generate,
        }
    }

    /// Replace the function used to mint VINs for payloads that omit one.
    pub fn with_vin_source(mut self, vin_source: fn() -> String) -> Self {
        self.vin_source = vin_source;
        self
    }

    /// Point lookup by VIN. Absence is not an error.
    pub async fn get_vehicle(&self, vin: &str) -> VehicleResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE vin = ?"
        ))
        .bind(vin)
        .fetch_optional(&*self.db)
        .await?;
        Ok(vehicle)
    }

    /// Return up to `limit` vehicles after skipping `skip`, in insertion order.
    ///
    /// Skipping past the end yields an empty page.
    pub async fn list_vehicles(&self, params: ListVehiclesParams) -> VehicleResult<Vec<Vehicle>> {
        let skip = params.skip.unwrap_or(0);
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        debug!(skip, limit, "listing vehicles");

        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles ORDER BY rowid LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(skip))
        .fetch_all(&*self.db)
        .await?;
        Ok(vehicles)
    }

    /// Validate and persist a new vehicle, returning the stored row.
    ///
    /// A caller-supplied VIN that is already taken fails with `VinConflict`.
    /// A generated VIN that collides is replaced, up to `MAX_VIN_ATTEMPTS`
    /// times.
    pub async fn create_vehicle(&self, draft: VehicleCreate) -> VehicleResult<Vehicle> {
        draft.validate()?;

        if let Some(vin) = draft.vin.as_deref() {
            return match self.try_insert(vin, &draft).await? {
                Some(vehicle) => {
                    info!(vin = %vehicle.vin, "created vehicle");
                    Ok(vehicle)
                }
                None => Err(VehicleError::VinConflict(vin.to_string())),
            };
        }

        for attempt in 1..=MAX_VIN_ATTEMPTS {
            let vin = (self.vin_source)();
            if let Some(vehicle) = self.try_insert(&vin, &draft).await? {
                info!(vin = %vehicle.vin, attempt, "created vehicle with generated VIN");
                return Ok(vehicle);
            }
            warn!(%vin, attempt, "generated VIN already taken, retrying");
        }

        Err(VehicleError::VinSpaceExhausted(MAX_VIN_ATTEMPTS))
    }

    /// Overwrite every mutable field of the vehicle at `vin`.
    ///
    /// Returns `None` without writing anything when no such vehicle exists.
    /// Any `vin` in the payload is ignored.
    pub async fn update_vehicle(
        &self,
        vin: &str,
        draft: VehicleCreate,
    ) -> VehicleResult<Option<Vehicle>> {
        draft.validate()?;

        let updated = sqlx::query_as::<_, Vehicle>(&format!(
            "UPDATE vehicles SET
                manufacturer_name = ?, description = ?, horse_power = ?, model_name = ?,
                model_year = ?, purchase_price = ?, fuel_type = ?, color = ?, category = ?
             WHERE vin = ?
             RETURNING {VEHICLE_COLUMNS}"
        ))
        .bind(&draft.manufacturer_name)
        .bind(&draft.description)
        .bind(draft.horse_power)
        .bind(&draft.model_name)
        .bind(draft.model_year)
        .bind(draft.purchase_price)
        .bind(&draft.fuel_type)
        .bind(&draft.color)
        .bind(&draft.category)
        .bind(vin)
        .fetch_optional(&*self.db)
        .await?;

        match &updated {
            Some(_) => info!(%vin, "updated vehicle"),
            None => debug!(%vin, "update skipped, vehicle not found"),
        }
        Ok(updated)
    }

    /// Remove the vehicle at `vin`. Returns whether a row was deleted.
    pub async fn delete_vehicle(&self, vin: &str) -> VehicleResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE vin = ?")
            .bind(vin)
            .execute(&*self.db)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(%vin, "deleted vehicle");
        }
        Ok(deleted)
    }

    /// Cheap round trip used by the readiness check.
    pub async fn ping(&self) -> VehicleResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }

    /// Insert `draft` under `vin` as one autocommit statement.
    ///
    /// Returns `None` if the primary key already holds `vin`.
    async fn try_insert(
        &self,
        vin: &str,
        draft: &VehicleCreate,
    ) -> VehicleResult<Option<Vehicle>> {
        let inserted = sqlx::query_as::<_, Vehicle>(&format!(
            "INSERT INTO vehicles ({VEHICLE_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING {VEHICLE_COLUMNS}"
        ))
        .bind(vin)
        .bind(&draft.manufacturer_name)
        .bind(&draft.description)
        .bind(draft.horse_power)
        .bind(&draft.model_name)
        .bind(draft.model_year)
        .bind(draft.purchase_price)
        .bind(&draft.fuel_type)
        .bind(&draft.color)
        .bind(&draft.category)
        .fetch_one(&*self.db)
        .await;

        match inserted {
            Ok(vehicle) => Ok(Some(vehicle)),
            Err(err) if is_unique_violation(&err) => {
                debug!(%vin, "VIN already taken");
                Ok(None)
            }
            Err(err) => Err(VehicleError::Sqlx(err)),
        }
    }
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
