//! Core data types shared across the application.

pub mod errors;
pub mod model;
