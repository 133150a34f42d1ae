// src/db/report_repo.rs

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::report::{
        Report, ReportListQuery, ReportOverviewStats, ReportStats, ReportStatus,
    },
};

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert por (agente, dia): o segundo envio do mesmo dia atualiza o
    /// registro existente em vez de criar duplicata.
    pub async fn upsert(
        &self,
        agent_id: Uuid,
        report_date: NaiveDate,
        content: &str,
        activities_completed: &[String],
        stats: &ReportStats,
    ) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (agent_id, report_date, content, activities_completed, stats)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (agent_id, report_date) DO UPDATE
            SET content = EXCLUDED.content,
                activities_completed = EXCLUDED.activities_completed,
                stats = EXCLUDED.stats,
                status = 'submitted',
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(agent_id)
        .bind(report_date)
        .bind(content)
        .bind(activities_completed)
        .bind(Json(stats.clone()))
        .fetch_one(&self.pool)
        .await?;
        Ok(report)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    pub async fn find_for_day(
        &self,
        agent_id: Uuid,
        report_date: NaiveDate,
    ) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE agent_id = $1 AND report_date = $2",
        )
        .bind(agent_id)
        .bind(report_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(report)
    }

    pub async fn list(
        &self,
        q: &ReportListQuery,
        restrict_to_agent: Option<Uuid>,
    ) -> Result<Vec<Report>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM reports WHERE 1=1");

        if let Some(agent) = restrict_to_agent {
            builder.push(" AND agent_id = ");
            builder.push_bind(agent);
        }
        if let Some(agent) = q.agent_id {
            builder.push(" AND agent_id = ");
            builder.push_bind(agent);
        }
        if let Some(status) = q.status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        if let Some(from) = q.from {
            builder.push(" AND report_date >= ");
            builder.push_bind(from);
        }
        if let Some(to) = q.to {
            builder.push(" AND report_date <= ");
            builder.push_bind(to);
        }

        let limit = q.limit.unwrap_or(20).clamp(1, 100);
        let offset = (q.page.unwrap_or(1).max(1) - 1) * limit;
        builder.push(" ORDER BY report_date DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let reports = builder
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await?;
        Ok(reports)
    }

    /// Relatórios dos agentes de uma zona (território do admin).
    pub async fn list_by_zone(&self, zone: &str) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT r.* FROM reports r
            INNER JOIN users u ON u.id = r.agent_id
            WHERE u.zone = $1
            ORDER BY r.report_date DESC
            "#,
        )
        .bind(zone)
        .fetch_all(&self.pool)
        .await?;
        Ok(reports)
    }

    pub async fn review(
        &self,
        id: Uuid,
        status: ReportStatus,
        reviewed_by: Uuid,
        review_notes: Option<&str>,
    ) -> Result<Report, AppError> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET status = $2, reviewed_by = $3, reviewed_at = NOW(),
                review_notes = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewed_by)
        .bind(review_notes)
        .fetch_optional(&self.pool)
        .await?;
        report.ok_or(AppError::NotFound("Relatório"))
    }

    pub async fn overview_stats(&self) -> Result<ReportOverviewStats, AppError> {
        let row: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE report_date = CURRENT_DATE),
                COUNT(*) FILTER (WHERE status = 'submitted')
            FROM reports
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ReportOverviewStats {
            total_reports: row.0,
            submitted_today: row.1,
            pending_review: row.2,
        })
    }
}
