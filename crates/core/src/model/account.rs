use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 20;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 64;

const SALT_BYTES: usize = 16;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccountError {
    #[error("username must be 3-20 characters")]
    UsernameLength,

    #[error("username may only contain letters, digits and underscores")]
    UsernameCharacters,

    #[error("password must be 8-64 characters")]
    PasswordLength,

    #[error("password must contain at least one letter and one digit")]
    PasswordComplexity,
}

//
// ─── USERNAME ──────────────────────────────────────────────────────────────────
//

/// Account login name: ASCII letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// # Errors
    ///
    /// Returns `AccountError::UsernameLength` or `AccountError::UsernameCharacters`.
    pub fn parse(raw: &str) -> Result<Self, AccountError> {
        let raw = raw.trim();
        if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&raw.len()) {
            return Err(AccountError::UsernameLength);
        }
        if !raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            return Err(AccountError::UsernameCharacters);
        }
        Ok(Self(raw.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Checks the password rules applied at registration.
///
/// # Errors
///
/// Returns `AccountError::PasswordLength` or `AccountError::PasswordComplexity`.
pub fn validate_password(raw: &str) -> Result<(), AccountError> {
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&raw.chars().count()) {
        return Err(AccountError::PasswordLength);
    }
    let has_letter = raw.chars().any(char::is_alphabetic);
    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err(AccountError::PasswordComplexity);
    }
    Ok(())
}

//
// ─── PASSWORD HASH ─────────────────────────────────────────────────────────────
//

/// Salted SHA-256 digest of an account password, hex encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    /// Hashes `password` under a fresh random salt.
    #[must_use]
    pub fn derive(password: &str) -> Self {
        let salt: [u8; SALT_BYTES] = rand::random();
        Self::derive_with_salt(password, &hex::encode(salt))
    }

    #[must_use]
    pub fn derive_with_salt(password: &str, salt: &str) -> Self {
        Self {
            salt: salt.to_owned(),
            digest: digest(salt, password),
        }
    }

    /// Rehydrate a hash loaded from storage.
    #[must_use]
    pub fn from_persisted(salt: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            digest: digest.into(),
        }
    }

    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let candidate = digest(&self.salt, password);
        candidate.len() == self.digest.len()
            && candidate
                .bytes()
                .zip(self.digest.bytes())
                .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }

    #[must_use]
    pub fn salt(&self) -> &str {
        &self.salt
    }

    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHash").finish_non_exhaustive()
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
