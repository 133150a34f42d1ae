// src/db/source_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::source::CustomerSource};

#[derive(Clone)]
pub struct SourceRepository {
    pool: PgPool,
}

impl SourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<CustomerSource>, AppError> {
        let sources = sqlx::query_as::<_, CustomerSource>(
            "SELECT * FROM customer_sources ORDER BY is_default DESC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sources)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CustomerSource>, AppError> {
        let source =
            sqlx::query_as::<_, CustomerSource>("SELECT * FROM customer_sources WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(source)
    }

    pub async fn find_by_value(&self, value: &str) -> Result<Option<CustomerSource>, AppError> {
        let source =
            sqlx::query_as::<_, CustomerSource>("SELECT * FROM customer_sources WHERE value = $1")
                .bind(value)
                .fetch_optional(&self.pool)
                .await?;
        Ok(source)
    }

    pub async fn create(&self, name: &str, value: &str) -> Result<CustomerSource, AppError> {
        sqlx::query_as::<_, CustomerSource>(
            "INSERT INTO customer_sources (name, value) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("A fonte '{}' já existe.", name));
                }
            }
            e.into()
        })
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        value: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<CustomerSource, AppError> {
        let source = sqlx::query_as::<_, CustomerSource>(
            r#"
            UPDATE customer_sources
            SET name = COALESCE($2, name),
                value = COALESCE($3, value),
                is_active = COALESCE($4, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(value)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict("Já existe uma fonte com esse nome.".into());
                }
            }
            AppError::from(e)
        })?;
        source.ok_or(AppError::NotFound("Fonte"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM customer_sources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Fonte"));
        }
        Ok(())
    }
}
