//! Password and security-answer checks against the fixed user directory.
//!
//! An unknown email always fails the same way a wrong credential does, and
//! a password check for an unknown email still pays for one Argon2
//! verification against a decoy hash.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::OnceCell;
use thiserror::Error;

use super::models::{User, UserSeed, SEED_USERS};

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

static SEEDED: OnceCell<Arc<UserDirectory>> = OnceCell::new();

/// Read-only table of users, built once.
#[derive(Debug)]
pub struct UserDirectory {
    users: Vec<User>,
    decoy_hash: String,
}

impl UserDirectory {
    /// Hash every seed and build the directory.
    pub fn from_seeds(seeds: &[UserSeed]) -> Result<Self, VerifierError> {
        let users = seeds
            .iter()
            .map(|seed| -> Result<User, VerifierError> {
                Ok(User {
                    id: seed.id,
                    email: seed.email.to_lowercase(),
                    password_hash: hash_password(seed.password)?,
                    security_answers: seed
                        .security_answers
                        .iter()
                        .map(|answer| answer.to_string())
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let decoy_hash = hash_password("decoy-password-never-matches")?;

        Ok(Self { users, decoy_hash })
    }

    /// The process-wide directory built from [`SEED_USERS`]. Hashing happens
    /// on first use only.
    pub fn seeded() -> Result<Arc<Self>, VerifierError> {
        SEEDED
            .get_or_try_init(|| Self::from_seeds(SEED_USERS).map(Arc::new))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Case-insensitive email lookup.
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        let email = email.to_lowercase();
        self.users.iter().find(|user| user.email == email)
    }

    /// Whether `password` is the password of the user registered under `email`.
    pub fn verify_password(&self, email: &str, password: &str) -> Result<bool, VerifierError> {
        let user = self.find_by_email(email);
        let stored = user.map_or(self.decoy_hash.as_str(), |user| user.password_hash.as_str());

        let parsed =
            PasswordHash::new(stored).map_err(|e| VerifierError::MalformedHash(e.to_string()))?;
        let matches = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();

        Ok(user.is_some() && matches)
    }

    /// Ordered comparison of answers: same count, and each supplied answer
    /// equals the stored one at the same position after trimming and
    /// lower-casing both.
    pub fn verify_security_answers<S: AsRef<str>>(&self, email: &str, answers: &[S]) -> bool {
        let Some(user) = self.find_by_email(email) else {
            return false;
        };

        user.security_answers.len() == answers.len()
            && user
                .security_answers
                .iter()
                .zip(answers)
                .all(|(expected, given)| normalize(expected) == normalize(given.as_ref()))
    }
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, VerifierError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| VerifierError::Hash(e.to_string()))
}
