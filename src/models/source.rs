// src/models/source.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Origem de captação do lead. As fontes padrão (seed) são imutáveis.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSource {
    pub id: Uuid,
    pub name: String,
    // Derivado do nome: minúsculas com underscores ("Walk In" -> "walk_in")
    pub value: String,
    pub is_default: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSourcePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSourcePayload {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Fontes padrão são totalmente imutáveis: nem o nome nem o estado ativo
/// podem mudar em uma atualização.
pub fn default_source_locked(is_default: bool, payload: &UpdateSourcePayload) -> bool {
    is_default && (payload.name.is_some() || payload.is_active.is_some())
}

/// Normaliza um nome de fonte para o valor snake_case minúsculo.
pub fn slugify_source(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_e_snake_case_minusculo() {
        assert_eq!(slugify_source("Walk In"), "walk_in");
        assert_eq!(slugify_source("  Phone   Call "), "phone_call");
        assert_eq!(slugify_source("Facebook"), "facebook");
    }

    #[test]
    fn fonte_padrao_rejeita_renomear_e_desativar() {
        let rename = UpdateSourcePayload {
            name: Some("Outro Nome".into()),
            is_active: None,
        };
        let deactivate = UpdateSourcePayload {
            name: None,
            is_active: Some(false),
        };
        let empty = UpdateSourcePayload {
            name: None,
            is_active: None,
        };
        assert!(default_source_locked(true, &rename));
        assert!(default_source_locked(true, &deactivate));
        assert!(!default_source_locked(true, &empty));
        // Fontes criadas pelo usuário seguem livres
        assert!(!default_source_locked(false, &rename));
        assert!(!default_source_locked(false, &deactivate));
    }
}
