use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::AppError;

/// The operator shared secret. Only an argon2 hash of the configured
/// password is kept in memory; callers supply the plain password per request.
#[derive(Clone)]
pub struct AdminSecret {
    hash: String,
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminSecret(..)")
    }
}

impl AdminSecret {
    pub fn new(password: &str) -> Result<Self, AppError> {
        Ok(Self { hash: hash_password(password)? })
    }

    /// True when `candidate` matches the configured password.
    /// A missing or empty candidate never matches.
    pub fn verify(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        match verify_password(candidate, &self.hash) {
            Ok(ok) => ok,
            Err(e) => {
                log::error!("Admin password verification failed: {e}");
                false
            }
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AppError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
