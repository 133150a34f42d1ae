// src/models/report.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Submitted,
    Reviewed,
    Acknowledged,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportStats {
    pub customers_added: i32,
    pub customers_called: i32,
    pub visits_completed: i32,
    pub properties_shown: i32,
}

// Um relatório por (agente, dia). A data é normalizada para o dia-calendário.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub report_date: NaiveDate,
    pub content: Option<String>,
    pub activities_completed: Vec<String>,
    #[schema(value_type = ReportStats)]
    pub stats: Json<ReportStats>,
    pub status: ReportStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportPayload {
    #[validate(length(min = 1, message = "O conteúdo do relatório é obrigatório."))]
    pub content: String,
    pub activities_completed: Option<Vec<String>>,
    pub stats: Option<ReportStats>,
    // Ausente = hoje
    pub report_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReportPayload {
    pub status: ReportStatus,
    pub review_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListQuery {
    pub agent_id: Option<Uuid>,
    pub status: Option<ReportStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportOverviewStats {
    pub total_reports: i64,
    pub submitted_today: i64,
    pub pending_review: i64,
}
