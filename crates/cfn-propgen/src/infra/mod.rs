//! Infrastructure concerns: configuration and environment.

pub mod config;
