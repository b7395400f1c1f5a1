pub mod access_key;
pub mod auth;
pub mod booking;
pub mod profile;
pub mod tenancy;
