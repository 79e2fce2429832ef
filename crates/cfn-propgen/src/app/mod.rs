//! Application layer orchestrating domain logic and infrastructure.

pub mod extract;
pub mod report;
pub mod scan;
