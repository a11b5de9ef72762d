use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};

/// Quiz answers attached to a duty: one correct option and the decoys
/// shown alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutyAnswers {
    pub correct: String,
    pub incorrect: Vec<String>,
}

#[derive(Clone)]
pub struct DutyRepository {
    pool: SqlitePool,
}

impl DutyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add(
        &self,
        name: &str,
        about: &str,
        question: &str,
        answers: &DutyAnswers,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"INSERT INTO duties (name, about, question, answers) VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(name)
        .bind(about)
        .bind(question)
        .bind(serde_json::to_string(answers)?)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> Result<Option<DutyRow>> {
        let row = sqlx::query_as::<_, DutyRow>(
            r#"SELECT id, name, about, question, answers FROM duties WHERE id = ?1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<DutyRow>> {
        let row = sqlx::query_as::<_, DutyRow>(
            r#"SELECT id, name, about, question, answers FROM duties WHERE name = ?1"#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn all(&self) -> Result<Vec<DutyRow>> {
        let rows = sqlx::query_as::<_, DutyRow>(
            r#"SELECT id, name, about, question, answers FROM duties ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update_name(&self, id: i64, name: &str) -> Result<bool> {
        self.update_column(id, "name", name).await
    }

    pub async fn update_about(&self, id: i64, about: &str) -> Result<bool> {
        self.update_column(id, "about", about).await
    }

    pub async fn update_question(&self, id: i64, question: &str) -> Result<bool> {
        self.update_column(id, "question", question).await
    }

    pub async fn update_answers(&self, id: i64, answers: &DutyAnswers) -> Result<bool> {
        self.update_column(id, "answers", &serde_json::to_string(answers)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let affected = sqlx::query(r#"DELETE FROM duties WHERE id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    async fn update_column(&self, id: i64, column: &'static str, value: &str) -> Result<bool> {
        let sql = format!("UPDATE duties SET {} = ?2 WHERE id = ?1", column);
        let affected = sqlx::query(&sql)
            .bind(id)
            .bind(value)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DutyRow {
    pub id: i64,
    pub name: String,
    pub about: String,
    pub question: String,
    pub answers: DutyAnswers,
}

impl<'r> FromRow<'r, SqliteRow> for DutyRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let raw: String = row.try_get("answers")?;
        let answers = serde_json::from_str(&raw).map_err(|err| sqlx::Error::ColumnDecode {
            index: "answers".into(),
            source: Box::new(err),
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            about: row.try_get("about")?,
            question: row.try_get("question")?,
            answers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    fn answers() -> DutyAnswers {
        DutyAnswers {
            correct: "yes".to_string(),
            incorrect: vec!["no".to_string(), "maybe".to_string(), "later".to_string()],
        }
    }

    #[tokio::test]
    async fn add_get_update_round_trip() {
        let pool = memory_pool().await.unwrap();
        let duties = DutyRepository::new(pool);

        let id = duties
            .add("packer", "packs boxes", "can you pack?", &answers())
            .await
            .unwrap();

        let row = duties.get(id).await.unwrap().unwrap();
        assert_eq!(row.name, "packer");
        assert_eq!(row.answers, answers());

        assert!(duties.update_about(id, "packs and labels").await.unwrap());
        let row = duties.get(id).await.unwrap().unwrap();
        assert_eq!(row.about, "packs and labels");

        assert!(duties.get_by_name("packer").await.unwrap().is_some());
        assert!(duties.get_by_name("driver").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_by_schema() {
        let pool = memory_pool().await.unwrap();
        let duties = DutyRepository::new(pool);

        duties.add("packer", "a", "q", &answers()).await.unwrap();
        assert!(duties.add("packer", "b", "q", &answers()).await.is_err());
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let pool = memory_pool().await.unwrap();
        let duties = DutyRepository::new(pool);

        let id = duties.add("packer", "a", "q", &answers()).await.unwrap();
        assert!(duties.delete(id).await.unwrap());
        assert!(!duties.delete(id).await.unwrap());
    }
}
