pub mod health_handlers;
pub mod vehicle_handlers;
