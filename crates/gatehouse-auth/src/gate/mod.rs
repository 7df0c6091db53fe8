//! Request admission: access rules and the authentication gate.

pub mod access;
pub mod authenticator;

pub use access::{AccessPolicy, PathPattern, Requirement};
pub use authenticator::{
    AccessDecision, AuthMethod, Authentication, AuthenticationGate, Credentials, LoginOutcome,
};
