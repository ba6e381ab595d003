use quiz_core::model::{AccountRef, PasswordHash, Username};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{account_ref_from_i64, conn, ser};
use crate::repository::{AccountRecord, AccountService, NewAccountRecord, StorageError};

fn account_from_row(row: &SqliteRow) -> Result<AccountRecord, StorageError> {
    let id = account_ref_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let username: String = row.try_get("username").map_err(ser)?;
    let username = Username::parse(&username).map_err(ser)?;
    let salt: String = row.try_get("password_salt").map_err(ser)?;
    let digest: String = row.try_get("password_digest").map_err(ser)?;
    let created_at = row.try_get("created_at").map_err(ser)?;

    Ok(AccountRecord {
        id,
        username,
        password: PasswordHash::from_persisted(salt, digest),
        created_at,
    })
}

#[async_trait::async_trait]
impl AccountService for SqliteRepository {
    async fn find_account(
        &self,
        username: &Username,
    ) -> Result<Option<AccountRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, password_salt, password_digest, created_at
            FROM accounts WHERE username = ?1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn insert_account(&self, account: NewAccountRecord) -> Result<AccountRef, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO accounts (username, password_salt, password_digest, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(account.username.as_str())
        .bind(account.password.salt())
        .bind(account.password.digest())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                StorageError::Conflict
            } else {
                conn(e)
            }
        })?;

        account_ref_from_i64(res.last_insert_rowid())
    }
}
