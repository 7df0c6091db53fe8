//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier as ArgonVerifier,
        SaltString, rand_core::OsRng,
    },
};
use async_trait::async_trait;

use gatehouse_core::error::AppError;
use gatehouse_core::traits::PasswordVerifier;

/// Secret hashed at construction and verified against when the presented
/// username does not exist.
const DUMMY_SECRET: &str = "gatehouse-timing-equalizer";

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    /// Cost parameters for newly created hashes.
    params: Params,
    /// Hash of [`DUMMY_SECRET`] with the same parameters.
    dummy_hash: Option<String>,
}

impl Argon2Hasher {
    /// Creates a hasher with the Argon2 default cost parameters.
    pub fn new() -> Self {
        Self::build(Params::default())
    }

    /// Creates a hasher with explicit memory (KiB), iteration, and parallelism costs.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AppError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self::build(params))
    }

    fn build(params: Params) -> Self {
        let mut hasher = Self {
            params,
            dummy_hash: None,
        };
        hasher.dummy_hash = hasher.hash_password(DUMMY_SECRET).ok();
        hasher
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored PHC-formatted hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordVerifier for Argon2Hasher {
    async fn verify(&self, presented: &str, credential_hash: &str) -> Result<bool, AppError> {
        self.verify_password(presented, credential_hash)
    }

    async fn verify_dummy(&self, presented: &str) {
        if let Some(hash) = &self.dummy_hash {
            let _ = self.verify_password(presented, hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::with_params(8, 1, 1).expect("params")
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = cheap();
        let hash = hasher.hash_password("correct-pw").expect("hash");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct-pw", &hash).expect("verify"));
        assert!(!hasher.verify_password("wrong-pw", &hash).expect("verify"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = cheap();
        let a = hasher.hash_password("pw").expect("hash");
        let b = hasher.hash_password("pw").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = cheap();
        assert!(hasher.verify_password("pw", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_rejects_invalid_params() {
        assert!(Argon2Hasher::with_params(0, 0, 0).is_err());
    }

    #[tokio::test]
    async fn test_trait_verify_and_dummy() {
        let hasher = cheap();
        let hash = hasher.hash_password("pw").expect("hash");

        assert!(hasher.verify("pw", &hash).await.expect("verify"));
        assert!(hasher.dummy_hash.is_some());
        hasher.verify_dummy("anything").await;
    }
}
