use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};

use crate::domain::{recipient::display_name, Recipient};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers a user on first interaction, refreshing the name fields on
    /// repeat contact. Users are never deleted by this backend.
    pub async fn upsert(
        &self,
        chat_id: i64,
        username: Option<&str>,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO users (chat_id, username, first_name, last_name)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(chat_id) DO UPDATE SET
                    username = excluded.username,
                    first_name = excluded.first_name,
                    last_name = excluded.last_name"#,
        )
        .bind(chat_id)
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, chat_id: i64) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT chat_id, username, first_name, last_name, unread, info, created_at
                FROM users WHERE chat_id = ?1"#,
        )
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn all(&self) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"SELECT chat_id, username, first_name, last_name, unread, info, created_at
                FROM users ORDER BY created_at"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Users that have at least one dialog message, newest dialog first.
    pub async fn with_dialogs(&self) -> Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"SELECT u.chat_id, u.username, u.first_name, u.last_name, u.unread, u.info, u.created_at
                FROM users u
                WHERE u.chat_id IN (SELECT DISTINCT chat_id FROM messages)
                ORDER BY (SELECT MAX(m.id) FROM messages m WHERE m.chat_id = u.chat_id) DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn unread_count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM users WHERE unread = 1"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    pub async fn set_unread(&self, chat_id: i64, unread: bool) -> Result<bool> {
        let affected = sqlx::query(r#"UPDATE users SET unread = ?2 WHERE chat_id = ?1"#)
            .bind(chat_id)
            .bind(unread)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    pub async fn set_info(&self, chat_id: i64, info: &str) -> Result<bool> {
        let affected = sqlx::query(r#"UPDATE users SET info = ?2 WHERE chat_id = ?1"#)
            .bind(chat_id)
            .bind(info)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRow {
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub unread: bool,
    pub info: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn display(&self) -> String {
        display_name(
            self.username.as_deref(),
            self.first_name.as_deref(),
            self.last_name.as_deref(),
        )
    }

    pub fn recipient(&self) -> Recipient {
        Recipient::new(self.chat_id, self.display())
    }
}

impl<'r> FromRow<'r, SqliteRow> for UserRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            chat_id: row.try_get("chat_id")?,
            username: row.try_get("username")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            unread: row.try_get("unread")?,
            info: row.try_get("info")?,
            created_at: row.try_get("created_at")?,
        })
    }
}
