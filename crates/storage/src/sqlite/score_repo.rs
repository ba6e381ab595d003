use quiz_core::model::ScoreRecord;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::SqliteRepository;
use super::mapping::{account_ref_from_i64, conn, id_i64, ser, u32_from_i64};
use crate::repository::{StorageError, UserStore};

fn score_from_row(row: &SqliteRow) -> Result<ScoreRecord, StorageError> {
    let player_name: String = row.try_get("player_name").map_err(ser)?;
    let account = row
        .try_get::<Option<i64>, _>("account_id")
        .map_err(ser)?
        .map(account_ref_from_i64)
        .transpose()?;
    let score = u32_from_i64("score", row.try_get::<i64, _>("score").map_err(ser)?)?;
    let total = u32_from_i64(
        "total_questions",
        row.try_get::<i64, _>("total_questions").map_err(ser)?,
    )?;
    let completed_at = row.try_get("completed_at").map_err(ser)?;

    ScoreRecord::from_persisted(player_name, account, score, total, completed_at).map_err(ser)
}

#[async_trait::async_trait]
impl UserStore for SqliteRepository {
    async fn store_score(&self, record: &ScoreRecord) -> Result<i64, StorageError> {
        let account_id = record
            .account()
            .map(|a| id_i64("account_id", a.value()))
            .transpose()?;

        let res = sqlx::query(
            r"
                INSERT INTO scores (player_name, account_id, score, total_questions, completed_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(record.player_name())
        .bind(account_id)
        .bind(i64::from(record.score()))
        .bind(i64::from(record.total_questions()))
        .bind(record.completed_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(res.last_insert_rowid())
    }

    async fn top_scores(&self, limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT player_name, account_id, score, total_questions, completed_at
                FROM scores
                ORDER BY score DESC, completed_at ASC, id ASC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(score_from_row).collect()
    }
}
