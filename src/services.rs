pub mod access_key_service;
pub mod auth;
pub mod availability_service;
pub mod booking_service;
pub mod profile_service;
pub mod tenancy_service;
