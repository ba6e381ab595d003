use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{AccountRef, PasswordHash, ScoreRecord, Username};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of an account.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: AccountRef,
    pub username: Username,
    pub password: PasswordHash,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an account that has no id yet.
#[derive(Debug, Clone)]
pub struct NewAccountRecord {
    pub username: Username,
    pub password: PasswordHash,
    pub created_at: DateTime<Utc>,
}

/// An account whose credentials were just checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccount {
    pub account: AccountRef,
    pub username: Username,
}

/// Account persistence and credential checks.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Look up an account by username (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures; a missing account is `Ok(None)`.
    async fn find_account(
        &self,
        username: &Username,
    ) -> Result<Option<AccountRecord>, StorageError>;

    /// Create an account and return its reference.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    async fn insert_account(&self, account: NewAccountRecord) -> Result<AccountRef, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn username_taken(&self, username: &Username) -> Result<bool, StorageError> {
        Ok(self.find_account(username).await?.is_some())
    }

    /// Check a username/password pair.
    ///
    /// Unknown usernames and wrong passwords both yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<VerifiedAccount>, StorageError> {
        let Ok(username) = Username::parse(username) else {
            return Ok(None);
        };
        let Some(record) = self.find_account(&username).await? else {
            return Ok(None);
        };
        if !record.password.verify(password) {
            return Ok(None);
        }
        Ok(Some(VerifiedAccount {
            account: record.id,
            username: record.username,
        }))
    }
}

/// Score persistence and leaderboard query.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Append a finished quiz result and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn store_score(&self, record: &ScoreRecord) -> Result<i64, StorageError>;

    /// Best results first: higher score, then earlier completion.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for backend failures.
    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError>;
}

#[derive(Default)]
struct AccountTable {
    next_id: u64,
    by_name: HashMap<String, AccountRecord>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    accounts: Arc<Mutex<AccountTable>>,
    scores: Arc<Mutex<Vec<ScoreRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn account_key(username: &Username) -> String {
    username.as_str().to_ascii_lowercase()
}

#[async_trait]
impl AccountService for InMemoryRepository {
    async fn find_account(
        &self,
        username: &Username,
    ) -> Result<Option<AccountRecord>, StorageError> {
        let guard = self
            .accounts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.by_name.get(&account_key(username)).cloned())
    }

    async fn insert_account(&self, account: NewAccountRecord) -> Result<AccountRef, StorageError> {
        let mut guard = self
            .accounts
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let key = account_key(&account.username);
        if guard.by_name.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        guard.next_id += 1;
        let id = AccountRef::new(guard.next_id);
        guard.by_name.insert(
            key,
            AccountRecord {
                id,
                username: account.username,
                password: account.password,
                created_at: account.created_at,
            },
        );
        Ok(id)
    }
}

#[async_trait]
impl UserStore for InMemoryRepository {
    async fn store_score(&self, record: &ScoreRecord) -> Result<i64, StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(record.clone());
        i64::try_from(guard.len()).map_err(|_| StorageError::Serialization("id overflow".into()))
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut out = guard.clone();
        out.sort_by(|a, b| {
            b.score()
                .cmp(&a.score())
                .then_with(|| a.completed_at().cmp(&b.completed_at()))
        });
        out.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(out)
    }
}

/// Aggregates the account and score stores behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub accounts: Arc<dyn AccountService>,
    pub scores: Arc<dyn UserStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let accounts: Arc<dyn AccountService> = Arc::new(repo.clone());
        let scores: Arc<dyn UserStore> = Arc::new(repo);
        Self { accounts, scores }
    }
}
