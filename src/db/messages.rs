use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};

#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, message: NewMessage<'_>) -> Result<i64> {
        let result = sqlx::query(
            r#"INSERT INTO messages (chat_id, from_admin, text, attachment, filename)
                VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )
        .bind(message.chat_id)
        .bind(message.from_admin)
        .bind(message.text)
        .bind(message.attachment)
        .bind(message.filename)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> Result<Option<MessageRow>> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"SELECT id, chat_id, from_admin, sent_at, text, attachment, filename
                FROM messages WHERE id = ?1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Full dialog history for one user, oldest first.
    pub async fn all_for_user(&self, chat_id: i64) -> Result<Vec<MessageRow>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"SELECT id, chat_id, from_admin, sent_at, text, attachment, filename
                FROM messages WHERE chat_id = ?1 ORDER BY id"#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewMessage<'a> {
    pub chat_id: i64,
    pub from_admin: bool,
    pub text: Option<&'a str>,
    pub attachment: Option<&'a [u8]>,
    pub filename: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageRow {
    pub id: i64,
    pub chat_id: i64,
    pub from_admin: bool,
    pub sent_at: DateTime<Utc>,
    pub text: Option<String>,
    #[serde(skip_serializing)]
    pub attachment: Option<Vec<u8>>,
    pub filename: Option<String>,
}

impl MessageRow {
    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }
}

impl<'r> FromRow<'r, SqliteRow> for MessageRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            chat_id: row.try_get("chat_id")?,
            from_admin: row.try_get("from_admin")?,
            sent_at: row.try_get("sent_at")?,
            text: row.try_get("text")?,
            attachment: row.try_get("attachment")?,
            filename: row.try_get("filename")?,
        })
    }
}
