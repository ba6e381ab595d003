use std::sync::Arc;
use tracing::info;

use quiz_core::model::{AccountRef, PasswordHash, Username, validate_password};
use storage::repository::{AccountService, NewAccountRecord, StorageError};

use crate::error::RegistrationError;
use crate::Clock;

/// Account sign-up and the availability checks the sign-up form runs while typing.
#[derive(Clone)]
pub struct RegistrationService {
    clock: Clock,
    accounts: Arc<dyn AccountService>,
}

impl RegistrationService {
    #[must_use]
    pub fn new(clock: Clock, accounts: Arc<dyn AccountService>) -> Self {
        Self { clock, accounts }
    }

    /// True if `raw` is a well-formed username nobody has claimed yet.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Storage` if the lookup fails.
    pub async fn check_username(&self, raw: &str) -> Result<bool, RegistrationError> {
        let Ok(username) = Username::parse(raw) else {
            return Ok(false);
        };
        Ok(!self.accounts.username_taken(&username).await?)
    }

    #[must_use]
    pub fn check_password(&self, raw: &str) -> bool {
        validate_password(raw).is_ok()
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUsername`, `InvalidPassword`, `PasswordMismatch`, or
    /// `UsernameTaken`, checked in that order.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<AccountRef, RegistrationError> {
        let username = Username::parse(username).map_err(RegistrationError::InvalidUsername)?;
        validate_password(password).map_err(RegistrationError::InvalidPassword)?;
        if password != confirmation {
            return Err(RegistrationError::PasswordMismatch);
        }

        let record = NewAccountRecord {
            username: username.clone(),
            password: PasswordHash::derive(password),
            created_at: self.clock.now(),
        };
        let id = self
            .accounts
            .insert_account(record)
            .await
            .map_err(|e| match e {
                StorageError::Conflict => RegistrationError::UsernameTaken,
                other => RegistrationError::Storage(other),
            })?;

        info!(account = %id, username = username.as_str(), "account registered");
        Ok(id)
    }
}
