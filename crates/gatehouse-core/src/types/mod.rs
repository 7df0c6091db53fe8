//! Core type definitions used across the Gatehouse workspace.

pub mod id;
pub mod principal;
pub mod session_limit;

pub use id::SessionId;
pub use principal::Principal;
pub use session_limit::SessionLimit;
