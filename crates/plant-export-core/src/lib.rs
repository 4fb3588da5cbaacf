//! # plant-export-core
//!
//! Shared building blocks for the Plant 3D export tooling: the unified
//! error type, the layered configuration loader and the logging settings
//! schema.
//!
//! This crate has **no** internal dependencies on other plant-export crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
