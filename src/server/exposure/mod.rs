//! API exposure

pub mod rest;

pub use rest::RestExposure;
