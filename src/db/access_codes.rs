use anyhow::Result;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};

#[derive(Clone)]
pub struct AccessCodeRepository {
    pool: SqlitePool,
}

impl AccessCodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, code: &str, role_id: i64) -> Result<i64> {
        let result = sqlx::query(r#"INSERT INTO access_codes (code, role_id) VALUES (?1, ?2)"#)
            .bind(code)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn all(&self) -> Result<Vec<AccessCodeRow>> {
        let rows = sqlx::query_as::<_, AccessCodeRow>(
            r#"SELECT id, code, role_id FROM access_codes ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn by_role(&self, role_id: i64) -> Result<Vec<AccessCodeRow>> {
        let rows = sqlx::query_as::<_, AccessCodeRow>(
            r#"SELECT id, code, role_id FROM access_codes WHERE role_id = ?1 ORDER BY id"#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let affected = sqlx::query(r#"DELETE FROM access_codes WHERE id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    /// Referential sweep after a role is deleted.
    pub async fn delete_by_role(&self, role_id: i64) -> Result<u64> {
        let affected = sqlx::query(r#"DELETE FROM access_codes WHERE role_id = ?1"#)
            .bind(role_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccessCodeRow {
    pub id: i64,
    pub code: String,
    pub role_id: i64,
}

impl<'r> FromRow<'r, SqliteRow> for AccessCodeRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            role_id: row.try_get("role_id")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    #[tokio::test]
    async fn role_sweep_only_touches_that_role() {
        let pool = memory_pool().await.unwrap();
        let codes = AccessCodeRepository::new(pool);

        codes.add("alpha", 1).await.unwrap();
        codes.add("beta", 1).await.unwrap();
        codes.add("gamma", 2).await.unwrap();

        assert_eq!(codes.delete_by_role(1).await.unwrap(), 2);
        let rest = codes.all().await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].code, "gamma");
    }
}
