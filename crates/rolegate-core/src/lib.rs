//! # rolegate-core
//!
//! Core crate for Rolegate. Contains configuration schemas, typed
//! identifiers, permission domain events, collaborator traits, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Rolegate crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
