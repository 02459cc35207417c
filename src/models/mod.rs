//! Data models for the vehicle store.
//!
//! `Vehicle` maps to the `vehicles` table via `sqlx::FromRow` and serializes
//! as the JSON response body; `VehicleCreate` is the inbound payload.

pub mod vehicle;
