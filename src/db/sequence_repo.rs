// src/db/sequence_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;

// Contadores atômicos por escopo ("PROP" para imóveis, "V-20250830" para o
// dia de visitas). O incremento-e-leitura em uma única instrução elimina a
// corrida leitura-depois-escrita do gerador original.
#[derive(Clone)]
pub struct SequenceRepository {
    pool: PgPool,
}

impl SequenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Próximo valor da sequência do escopo, começando em `start`.
    pub async fn next_value(&self, scope: &str, start: i64) -> Result<i64, AppError> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO code_counters (scope, value)
            VALUES ($1, $2)
            ON CONFLICT (scope) DO UPDATE SET value = code_counters.value + 1
            RETURNING value
            "#,
        )
        .bind(scope)
        .bind(start)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }
}
