// src/models/customer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Status do lead. `closed` é rejeição pelo agente; `closed_won` é venda
// concluída (é ele que dispara o evento "deal closed").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum CustomerStatus {
    New,
    Interested,
    VisitPossible,
    VisitDone,
    Sellable,
    ShortProcess,
    LongProcess,
    Closed,
    #[sqlx(rename = "closed_won")]
    #[serde(rename = "closed_won")]
    ClosedWon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

// --- SUB-OBJETOS (JSONB) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Budget {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

// Slot único: apenas a movimentação mais recente é retida
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovedFrom {
    pub agent: Uuid,
    pub moved_at: DateTime<Utc>,
    pub moved_by: Uuid,
}

// --- O LEAD ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,

    // Classificação geográfica livre (zona > thana)
    pub customer_zone: Option<String>,
    pub customer_thana: Option<String>,

    #[schema(value_type = Option<Budget>)]
    pub budget: Option<Json<Budget>>,
    pub preferred_location: Vec<String>,
    pub property_type: Vec<String>,
    pub interested_properties: Vec<Uuid>,

    pub assigned_agent: Option<Uuid>,
    pub added_by: Uuid,

    pub status: CustomerStatus,
    pub priority: Priority,

    pub last_contact_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub next_follow_up_action: Option<String>,
    // Derivado: nextFollowUpDate <= agora. Recalculado em toda escrita.
    pub is_follow_up_due: bool,

    pub source: String,
    pub referred_by: Option<String>,

    // Trilha de fechamento pelo agente
    pub agent_closed: bool,
    pub closed_by: Option<Uuid>,
    pub closed_at: Option<DateTime<Utc>>,
    pub close_reason: Option<String>,

    #[schema(value_type = Option<MovedFrom>)]
    pub moved_from: Option<Json<MovedFrom>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Nota de acompanhamento (thread do cliente)
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNote {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub text: String,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// Detalhe do cliente: o lead + as coleções derivadas
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub notes: Vec<CustomerNote>,
    pub visits: Vec<Uuid>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    pub name: Option<String>,

    #[validate(length(min = 6, message = "O telefone é obrigatório."))]
    #[schema(example = "+8801712345678")]
    pub phone: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub address: Option<String>,

    pub customer_zone: Option<String>,
    pub customer_thana: Option<String>,

    pub budget: Option<Budget>,
    pub preferred_location: Option<Vec<String>>,
    pub property_type: Option<Vec<String>>,
    pub interested_properties: Option<Vec<Uuid>>,

    pub assigned_agent: Option<Uuid>,

    pub status: Option<CustomerStatus>,
    pub priority: Option<Priority>,

    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub next_follow_up_action: Option<String>,

    #[schema(example = "website")]
    pub source: Option<String>,
    pub referred_by: Option<String>,
}

// Atualização parcial: apenas os campos presentes são escritos
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerPayload {
    pub name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub address: Option<String>,
    pub customer_zone: Option<String>,
    pub customer_thana: Option<String>,
    pub budget: Option<Budget>,
    pub preferred_location: Option<Vec<String>>,
    pub property_type: Option<Vec<String>>,
    pub interested_properties: Option<Vec<Uuid>>,
    pub assigned_agent: Option<Uuid>,
    pub status: Option<CustomerStatus>,
    pub priority: Option<Priority>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub next_follow_up_date: Option<DateTime<Utc>>,
    pub next_follow_up_action: Option<String>,
    pub source: Option<String>,
    pub referred_by: Option<String>,
    // Valor do negócio informado na transição para closed_won
    pub deal_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignAgentPayload {
    pub agent_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddNotePayload {
    #[validate(length(min = 1, message = "A nota não pode ser vazia."))]
    pub note: String,
    pub next_follow_up_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveCustomerPayload {
    pub zone: Option<String>,
    pub thana: Option<String>,
    pub agent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AgentClosePayload {
    pub reason: Option<String>,
}

// Filtros da listagem
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListQuery {
    pub status: Option<CustomerStatus>,
    pub priority: Option<Priority>,
    pub zone: Option<String>,
    pub source: Option<String>,
    pub assigned_agent: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_usa_kebab_case_na_serializacao() {
        assert_eq!(
            serde_json::to_string(&CustomerStatus::VisitPossible).unwrap(),
            "\"visit-possible\""
        );
        assert_eq!(
            serde_json::to_string(&CustomerStatus::ShortProcess).unwrap(),
            "\"short-process\""
        );
    }

    #[test]
    fn closed_won_mantem_o_literal_snake_case() {
        // O sinal de "deal closed" é exatamente o literal closed_won
        assert_eq!(
            serde_json::to_string(&CustomerStatus::ClosedWon).unwrap(),
            "\"closed_won\""
        );
        let parsed: CustomerStatus = serde_json::from_str("\"closed_won\"").unwrap();
        assert_eq!(parsed, CustomerStatus::ClosedWon);
    }
}
