//! Vehicle record store: CRUD over vehicles keyed by VIN, served over HTTP.

pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
