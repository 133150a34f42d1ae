// src/services/report_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::{
        auth::{User, UserRole},
        report::{
            Report, ReportListQuery, ReportOverviewStats, ReviewReportPayload,
            SubmitReportPayload,
        },
    },
};

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    /// Envio do relatório diário. A data é normalizada para o dia-calendário
    /// e o reenvio do mesmo dia atualiza o registro existente.
    pub async fn submit(&self, actor: &User, payload: SubmitReportPayload) -> Result<Report, AppError> {
        let report_date = payload.report_date.unwrap_or_else(|| Utc::now().date_naive());
        self.repo
            .upsert(
                actor.id,
                report_date,
                &payload.content,
                &payload.activities_completed.unwrap_or_default(),
                &payload.stats.unwrap_or_default(),
            )
            .await
    }

    /// Listagem completa: restrita ao super-admin.
    pub async fn list_all(&self, actor: &User, query: &ReportListQuery) -> Result<Vec<Report>, AppError> {
        if actor.role != UserRole::SuperAdmin {
            return Err(AppError::Forbidden(
                "Apenas o super-admin pode listar todos os relatórios.".into(),
            ));
        }
        self.repo.list(query, None).await
    }

    /// Relatórios da zona do chamador (território do admin).
    pub async fn list_zone(&self, actor: &User) -> Result<Vec<Report>, AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas administradores podem ver relatórios por zona.".into(),
            ));
        }
        let zone = actor.zone.as_deref().ok_or_else(|| {
            AppError::BadRequest("Sua conta não tem zona configurada.".into())
        })?;
        self.repo.list_by_zone(zone).await
    }

    pub async fn list_mine(&self, actor: &User, query: &ReportListQuery) -> Result<Vec<Report>, AppError> {
        self.repo.list(query, Some(actor.id)).await
    }

    /// GET /reports/today: o relatório de hoje do chamador, se existir.
    pub async fn today(&self, actor: &User) -> Result<Option<Report>, AppError> {
        self.repo
            .find_for_day(actor.id, Utc::now().date_naive())
            .await
    }

    pub async fn review(
        &self,
        actor: &User,
        id: Uuid,
        payload: ReviewReportPayload,
    ) -> Result<Report, AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas administradores podem revisar relatórios.".into(),
            ));
        }
        self.repo
            .review(id, payload.status, actor.id, payload.review_notes.as_deref())
            .await
    }

    pub async fn stats(&self, actor: &User) -> Result<ReportOverviewStats, AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas administradores podem ver as estatísticas.".into(),
            ));
        }
        self.repo.overview_stats().await
    }
}
