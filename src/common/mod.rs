//! Common module - errors and core types shared across the crate

pub mod errors;
pub mod types;
