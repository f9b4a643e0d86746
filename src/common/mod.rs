//! Error and data types shared across the crate

pub mod errors;
pub mod types;
