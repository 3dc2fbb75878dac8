//! # shopfront-core
//!
//! Core crate for Shopfront. Contains the durable-store trait,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Shopfront crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
