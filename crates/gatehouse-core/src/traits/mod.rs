//! Collaborator traits defined in `gatehouse-core` and implemented by other crates.

pub mod clock;
pub mod credential_store;
pub mod password_verifier;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credential_store::CredentialStore;
pub use password_verifier::PasswordVerifier;
