//! # gatehouse-core
//!
//! Core crate for Gatehouse. Contains the collaborator traits the
//! authentication gate depends on, configuration schemas, typed
//! identifiers, session events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Gatehouse crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
