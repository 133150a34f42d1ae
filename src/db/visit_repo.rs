// src/db/visit_repo.rs

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::visit::{CreateVisitPayload, UpdateVisitPayload, Visit, VisitListQuery, VisitStats},
};

#[derive(Clone)]
pub struct VisitRepository {
    pool: PgPool,
}

impl VisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        visit_code: &str,
        p: &CreateVisitPayload,
        agent_id: Uuid,
    ) -> Result<Visit, AppError> {
        let visit = sqlx::query_as::<_, Visit>(
            r#"
            INSERT INTO visits (
                visit_code, customer_id, agent_id, property_id, visit_date,
                status, notes, feedback, customer_interest,
                next_follow_up, follow_up_action
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(visit_code)
        .bind(p.customer_id)
        .bind(agent_id)
        .bind(p.property_id)
        .bind(p.visit_date)
        .bind(p.status.unwrap_or(crate::models::visit::VisitStatus::Scheduled))
        .bind(&p.notes)
        .bind(&p.feedback)
        .bind(p.customer_interest)
        .bind(p.next_follow_up)
        .bind(&p.follow_up_action)
        .fetch_one(&self.pool)
        .await?;
        Ok(visit)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Visit>, AppError> {
        let visit = sqlx::query_as::<_, Visit>("SELECT * FROM visits WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(visit)
    }

    pub async fn list(
        &self,
        q: &VisitListQuery,
        restrict_to_agent: Option<Uuid>,
    ) -> Result<Vec<Visit>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM visits WHERE 1=1");

        if let Some(agent) = restrict_to_agent {
            builder.push(" AND agent_id = ");
            builder.push_bind(agent);
        }
        if let Some(status) = q.status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        if let Some(customer) = q.customer_id {
            builder.push(" AND customer_id = ");
            builder.push_bind(customer);
        }
        if let Some(agent) = q.agent_id {
            builder.push(" AND agent_id = ");
            builder.push_bind(agent);
        }
        if let Some(from) = q.from {
            builder.push(" AND visit_date >= ");
            builder.push_bind(from);
        }
        if let Some(to) = q.to {
            builder.push(" AND visit_date <= ");
            builder.push_bind(to);
        }

        let limit = q.limit.unwrap_or(20).clamp(1, 100);
        let offset = (q.page.unwrap_or(1).max(1) - 1) * limit;
        builder.push(" ORDER BY visit_date DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let visits = builder
            .build_query_as::<Visit>()
            .fetch_all(&self.pool)
            .await?;
        Ok(visits)
    }

    /// Ids das visitas de um cliente (o visits[] derivado do detalhe).
    pub async fn list_ids_for_customer(&self, customer_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM visits WHERE customer_id = $1 ORDER BY visit_date ASC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn update(&self, id: Uuid, p: &UpdateVisitPayload) -> Result<Visit, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE visits SET updated_at = NOW()");

        if let Some(v) = p.visit_date {
            builder.push(", visit_date = ");
            builder.push_bind(v);
        }
        if let Some(v) = p.status {
            builder.push(", status = ");
            builder.push_bind(v);
        }
        if let Some(v) = &p.notes {
            builder.push(", notes = ");
            builder.push_bind(v.clone());
        }
        if let Some(v) = &p.feedback {
            builder.push(", feedback = ");
            builder.push_bind(v.clone());
        }
        if let Some(v) = p.customer_interest {
            builder.push(", customer_interest = ");
            builder.push_bind(v);
        }
        if let Some(v) = p.next_follow_up {
            builder.push(", next_follow_up = ");
            builder.push_bind(v);
        }
        if let Some(v) = &p.follow_up_action {
            builder.push(", follow_up_action = ");
            builder.push_bind(v.clone());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");

        let visit = builder
            .build_query_as::<Visit>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Visita"))?;
        Ok(visit)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM visits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Visita"));
        }
        Ok(())
    }

    // =========================================================================
    //  ESTATÍSTICAS
    // =========================================================================

    /// Agregados por período. `window` delimita visit_date em SQL.
    async fn stats_where(
        &self,
        window: &str,
        restrict_to_agent: Option<Uuid>,
    ) -> Result<VisitStats, AppError> {
        let sql = format!(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'scheduled') AS scheduled,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled
            FROM visits
            WHERE {} AND ($1::uuid IS NULL OR agent_id = $1)
            "#,
            window
        );

        let row: (i64, i64, i64, i64) = sqlx::query_as(&sql)
            .bind(restrict_to_agent)
            .fetch_one(&self.pool)
            .await?;

        Ok(VisitStats {
            total: row.0,
            scheduled: row.1,
            completed: row.2,
            cancelled: row.3,
        })
    }

    pub async fn stats_today(&self, agent: Option<Uuid>) -> Result<VisitStats, AppError> {
        self.stats_where("visit_date::date = CURRENT_DATE", agent).await
    }

    pub async fn stats_monthly(&self, agent: Option<Uuid>) -> Result<VisitStats, AppError> {
        self.stats_where(
            "date_trunc('month', visit_date) = date_trunc('month', NOW())",
            agent,
        )
        .await
    }

    pub async fn stats_total(&self, agent: Option<Uuid>) -> Result<VisitStats, AppError> {
        self.stats_where("TRUE", agent).await
    }
}
