// src/models/visit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

// Nível de interesse registrado pelo agente após a visita
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CustomerInterest {
    Interested,
    VeryInterested,
    NotInterested,
    Thinking,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: Uuid,
    // Formato V-YYYYMMDD-NNNN, sequência diária
    pub visit_code: String,
    pub customer_id: Uuid,
    pub agent_id: Uuid,
    pub property_id: Option<Uuid>,
    pub visit_date: DateTime<Utc>,
    pub status: VisitStatus,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    pub customer_interest: Option<CustomerInterest>,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub follow_up_action: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitPayload {
    pub customer_id: Uuid,
    pub property_id: Option<Uuid>,
    pub visit_date: DateTime<Utc>,
    pub status: Option<VisitStatus>,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    pub customer_interest: Option<CustomerInterest>,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub follow_up_action: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisitPayload {
    pub visit_date: Option<DateTime<Utc>>,
    pub status: Option<VisitStatus>,
    pub notes: Option<String>,
    pub feedback: Option<String>,
    pub customer_interest: Option<CustomerInterest>,
    pub next_follow_up: Option<DateTime<Utc>>,
    pub follow_up_action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitListQuery {
    pub status: Option<VisitStatus>,
    pub customer_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// Agregados de GET /api/visits/stats/*
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitStats {
    pub total: i64,
    pub scheduled: i64,
    pub completed: i64,
    pub cancelled: i64,
}
