// src/models/property.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Situação comercial do imóvel. A entrada "sale" é normalizada para "sell".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyState {
    Sold,
    Premium,
    Sell,
    Rent,
}

impl PropertyState {
    /// Aceita os literais do enum e o sinônimo "sale".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "sold" => Some(PropertyState::Sold),
            "premium" => Some(PropertyState::Premium),
            "sell" | "sale" => Some(PropertyState::Sell),
            "rent" => Some(PropertyState::Rent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Available,
    UnderContract,
    Sold,
    Rented,
}

// Categoria do imóvel. A entrada tolera variações de caixa ("Apartment",
// "APARTMENT", "apartment").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Apartment,
    House,
    Duplex,
    Land,
    Commercial,
    Office,
}

impl PropertyType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "apartment" | "flat" => Some(PropertyType::Apartment),
            "house" => Some(PropertyType::House),
            "duplex" => Some(PropertyType::Duplex),
            "land" | "plot" => Some(PropertyType::Land),
            "commercial" => Some(PropertyType::Commercial),
            "office" => Some(PropertyType::Office),
            _ => None,
        }
    }
}

// --- O IMÓVEL ---

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    // Atribuído uma única vez, na primeira persistência. Nunca regenerado.
    pub property_code: String,
    pub name: String,
    pub description: Option<String>,

    #[schema(value_type = f64, example = 4500000.0)]
    pub price: Decimal,

    pub location: Option<String>,
    pub zone: Option<String>,
    pub thana: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,

    pub state: PropertyState,
    #[serde(rename = "type")]
    pub property_type: PropertyType,

    pub square_feet: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,

    pub images: Vec<String>,
    pub features: Vec<String>,

    pub uploaded_by: Uuid,
    pub assigned_agent: Option<Uuid>,

    // Mantidos em sincronia (legado do cliente web)
    pub is_published: bool,
    pub published_to_frontend: bool,

    // Contadores monotônicos
    pub view_count: i32,
    pub inquiry_count: i32,

    pub status: PropertyStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

// Campos textuais do multipart de criação. As imagens chegam como arquivos
// no mesmo formulário e são resolvidas pelo handler de upload.
#[derive(Debug, Default)]
pub struct CreatePropertyForm {
    pub property_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub zone: Option<String>,
    pub thana: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<PropertyState>,
    pub property_type: Option<PropertyType>,
    pub square_feet: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub features: Vec<String>,
    pub assigned_agent: Option<Uuid>,
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub zone: Option<String>,
    pub thana: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    // Strings cruas: passam pelos normalizadores tolerantes
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub square_feet: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub images: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub status: Option<PropertyStatus>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishPayload {
    pub is_published: bool,
}

// Filtros da listagem pública/administrativa
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListQuery {
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub state: Option<String>,
    pub status: Option<PropertyStatus>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub location: Option<String>,
    pub zone: Option<String>,
    pub property_code: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    // "price" | "-price" | "createdAt" | "-createdAt"
    pub sort: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_e_normalizado_para_sell() {
        assert_eq!(PropertyState::parse("sale"), Some(PropertyState::Sell));
        assert_eq!(PropertyState::parse("Sell"), Some(PropertyState::Sell));
        assert_eq!(PropertyState::parse("RENT"), Some(PropertyState::Rent));
        assert_eq!(PropertyState::parse("leased"), None);
    }

    #[test]
    fn categoria_tolera_variacao_de_caixa() {
        assert_eq!(PropertyType::parse("Apartment"), Some(PropertyType::Apartment));
        assert_eq!(PropertyType::parse("LAND"), Some(PropertyType::Land));
        assert_eq!(PropertyType::parse(" office "), Some(PropertyType::Office));
        assert_eq!(PropertyType::parse("castle"), None);
    }
}
