use anyhow::Result;
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{FromRow, Row};

#[derive(Clone)]
pub struct RoleRepository {
    pool: SqlitePool,
}

impl RoleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, name: &str, duties: &[i64]) -> Result<i64> {
        let result = sqlx::query(r#"INSERT INTO roles (name, duties) VALUES (?1, ?2)"#)
            .bind(name)
            .bind(serde_json::to_string(duties)?)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(&self, id: i64) -> Result<Option<RoleRow>> {
        let row =
            sqlx::query_as::<_, RoleRow>(r#"SELECT id, name, duties FROM roles WHERE id = ?1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<RoleRow>> {
        let row =
            sqlx::query_as::<_, RoleRow>(r#"SELECT id, name, duties FROM roles WHERE name = ?1"#)
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn all(&self) -> Result<Vec<RoleRow>> {
        let rows = sqlx::query_as::<_, RoleRow>(r#"SELECT id, name, duties FROM roles ORDER BY id"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Roles whose duty list contains the given duty. The duty list is a
    /// JSON array column, so this is a linear scan.
    pub async fn with_duty(&self, duty_id: i64) -> Result<Vec<RoleRow>> {
        let roles = self.all().await?;
        Ok(roles
            .into_iter()
            .filter(|role| role.duties.contains(&duty_id))
            .collect())
    }

    pub async fn update_name(&self, id: i64, name: &str) -> Result<bool> {
        let affected = sqlx::query(r#"UPDATE roles SET name = ?2 WHERE id = ?1"#)
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    pub async fn update_duties(&self, id: i64, duties: &[i64]) -> Result<bool> {
        let affected = sqlx::query(r#"UPDATE roles SET duties = ?2 WHERE id = ?1"#)
            .bind(id)
            .bind(serde_json::to_string(duties)?)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let affected = sqlx::query(r#"DELETE FROM roles WHERE id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    /// Referential sweep after a duty is deleted: drops the duty id from
    /// every role that still lists it.
    pub async fn remove_duty_from_all(&self, duty_id: i64) -> Result<usize> {
        let affected_roles = self.with_duty(duty_id).await?;
        let count = affected_roles.len();
        for role in affected_roles {
            let duties: Vec<i64> = role
                .duties
                .into_iter()
                .filter(|id| *id != duty_id)
                .collect();
            self.update_duties(role.id, &duties).await?;
        }
        Ok(count)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleRow {
    pub id: i64,
    pub name: String,
    pub duties: Vec<i64>,
}

impl<'r> FromRow<'r, SqliteRow> for RoleRow {
    fn from_row(row: &'r SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let raw: String = row.try_get("duties")?;
        let duties = serde_json::from_str(&raw).map_err(|err| sqlx::Error::ColumnDecode {
            index: "duties".into(),
            source: Box::new(err),
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            duties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    #[tokio::test]
    async fn duty_list_round_trips_through_json_column() {
        let pool = memory_pool().await.unwrap();
        let roles = RoleRepository::new(pool);

        let id = roles.add("manager", &[1, 2, 3]).await.unwrap();
        let row = roles.get(id).await.unwrap().unwrap();
        assert_eq!(row.duties, vec![1, 2, 3]);

        assert!(roles.update_duties(id, &[2]).await.unwrap());
        assert_eq!(roles.get(id).await.unwrap().unwrap().duties, vec![2]);
    }

    #[tokio::test]
    async fn remove_duty_sweeps_every_role() {
        let pool = memory_pool().await.unwrap();
        let roles = RoleRepository::new(pool);

        let a = roles.add("a", &[1, 2]).await.unwrap();
        let b = roles.add("b", &[2, 3]).await.unwrap();
        let c = roles.add("c", &[3]).await.unwrap();

        let touched = roles.remove_duty_from_all(2).await.unwrap();
        assert_eq!(touched, 2);
        assert_eq!(roles.get(a).await.unwrap().unwrap().duties, vec![1]);
        assert_eq!(roles.get(b).await.unwrap().unwrap().duties, vec![3]);
        assert_eq!(roles.get(c).await.unwrap().unwrap().duties, vec![3]);
    }

    #[tokio::test]
    async fn names_are_unique() {
        let pool = memory_pool().await.unwrap();
        let roles = RoleRepository::new(pool);

        roles.add("manager", &[]).await.unwrap();
        assert!(roles.add("manager", &[]).await.is_err());
        assert!(roles.get_by_name("manager").await.unwrap().is_some());
    }
}
