pub mod vehicle_service;
pub mod vin_codec;
