// src/handlers/properties.rs

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, ok, ok_message},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        customer::AssignAgentPayload,
        property::{
            CreatePropertyForm, Property, PropertyListQuery, PropertyState, PropertyType,
            PublishPayload, UpdatePropertyPayload,
        },
    },
    services::upload_service::MAX_FILES_PER_REQUEST,
};

/// Lê o multipart de criação: campos textuais viram o formulário, arquivos
/// no campo "images" são gravados em disco na hora.
async fn parse_create_form(
    app_state: &AppState,
    mut multipart: Multipart,
) -> Result<CreatePropertyForm, AppError> {
    let mut form = CreatePropertyForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart inválido: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "images" {
            if form.images.len() >= MAX_FILES_PER_REQUEST {
                return Err(AppError::BadRequest(
                    "No máximo 10 imagens por imóvel.".into(),
                ));
            }
            let content_type = field.content_type().unwrap_or_default().to_owned();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Falha ao ler o arquivo: {}", e)))?;
            let url = app_state.upload_service.save_image(&content_type, &data).await?;
            form.images.push(url);
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Campo '{}' ilegível: {}", name, e)))?;
        if text.trim().is_empty() {
            continue;
        }

        match name.as_str() {
            "propertyCode" => form.property_code = Some(text),
            "name" => form.name = Some(text),
            "description" => form.description = Some(text),
            "price" => {
                form.price = Some(Decimal::from_str(text.trim()).map_err(|_| {
                    AppError::BadRequest(format!("Preço inválido: '{}'.", text))
                })?)
            }
            "location" => form.location = Some(text),
            "zone" => form.zone = Some(text),
            "thana" => form.thana = Some(text),
            "area" => form.area = Some(text),
            "address" => form.address = Some(text),
            "city" => form.city = Some(text),
            "state" => {
                form.state = Some(PropertyState::parse(&text).ok_or_else(|| {
                    AppError::BadRequest(format!("Estado de imóvel inválido: '{}'.", text))
                })?)
            }
            "type" => {
                form.property_type = Some(PropertyType::parse(&text).ok_or_else(|| {
                    AppError::BadRequest(format!("Categoria de imóvel inválida: '{}'.", text))
                })?)
            }
            "squareFeet" => {
                form.square_feet = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("Metragem inválida: '{}'.", text))
                })?)
            }
            "bedrooms" => {
                form.bedrooms = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("Número de quartos inválido: '{}'.", text))
                })?)
            }
            "bathrooms" => {
                form.bathrooms = Some(text.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("Número de banheiros inválido: '{}'.", text))
                })?)
            }
            // Campo repetível
            "features" => form.features.push(text),
            "assignedAgent" => {
                form.assigned_agent = Some(Uuid::parse_str(text.trim()).map_err(|_| {
                    AppError::BadRequest(format!("ID de agente inválido: '{}'.", text))
                })?)
            }
            // Campos desconhecidos são ignorados, como o cliente web espera
            _ => {}
        }
    }

    Ok(form)
}

// POST /api/properties (multipart)
#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    responses(
        (status = 201, description = "Imóvel cadastrado com código gerado", body = Property)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = parse_create_form(&app_state, multipart).await?;
    let property = app_state.property_service.create(&actor, form).await?;
    Ok((StatusCode::CREATED, ok(property)))
}

// GET /api/properties
#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    responses(
        (status = 200, description = "Lista de imóveis com filtros", body = [Property])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_properties(
    State(app_state): State<AppState>,
    Query(query): Query<PropertyListQuery>,
) -> Result<Json<Value>, AppError> {
    let properties = app_state.property_service.list(&query).await?;
    Ok(ok(properties))
}

// GET /api/properties/{id} — incrementa o contador de visualizações
#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID do imóvel")),
    responses(
        (status = 200, description = "Detalhe do imóvel", body = Property),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_property(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let property = app_state.property_service.get(id).await?;
    Ok(ok(property))
}

// PUT /api/properties/{id}
#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "ID do imóvel")),
    request_body = UpdatePropertyPayload,
    responses(
        (status = 200, description = "Imóvel atualizado", body = Property)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyPayload>,
) -> Result<Json<Value>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let property = app_state
        .property_service
        .update(&actor, id, payload)
        .await?;
    Ok(ok(property))
}

// DELETE /api/properties/{id} — apenas super-admin
pub async fn delete_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.property_service.delete(&actor, id).await?;
    Ok(ok_message("Imóvel excluído com sucesso."))
}

// PATCH /api/properties/{id}/publish
pub async fn publish_property(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishPayload>,
) -> Result<Json<Value>, AppError> {
    let property = app_state
        .property_service
        .set_published(&actor, id, payload.is_published)
        .await?;
    Ok(ok(property))
}

// PATCH /api/properties/{id}/assign-agent
pub async fn assign_agent(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignAgentPayload>,
) -> Result<Json<Value>, AppError> {
    let property = app_state
        .property_service
        .assign_agent(&actor, id, payload.agent_id)
        .await?;
    Ok(ok(property))
}
