// src/handlers/sources.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, ok, ok_message},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminRole, RequireRole},
    },
    models::source::{
        CreateSourcePayload, UpdateSourcePayload, default_source_locked, slugify_source,
    },
};

// GET /api/sources
pub async fn list_sources(
    State(app_state): State<AppState>,
    AuthenticatedUser(_actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let sources = app_state.source_repo.list().await?;
    Ok(ok(sources))
}

// POST /api/sources — o value é derivado do nome (slug snake_case)
pub async fn create_source(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminRole>,
    Json(payload): Json<CreateSourcePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let value = slugify_source(&payload.name);
    let source = app_state.source_repo.create(&payload.name, &value).await?;
    Ok((StatusCode::CREATED, ok(source)))
}

// PUT /api/sources/{id}
pub async fn update_source(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSourcePayload>,
) -> Result<Json<Value>, AppError> {
    let current = app_state
        .source_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Fonte"))?;
    // As fontes semeadas são imutáveis: nem renomear, nem desativar
    if default_source_locked(current.is_default, &payload) {
        return Err(AppError::BadRequest(
            "Fontes padrão não podem ser alteradas.".into(),
        ));
    }

    let value = payload.name.as_deref().map(slugify_source);
    let source = app_state
        .source_repo
        .update(id, payload.name.as_deref(), value.as_deref(), payload.is_active)
        .await?;
    Ok(ok(source))
}

// DELETE /api/sources/{id}
pub async fn delete_source(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminRole>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let current = app_state
        .source_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Fonte"))?;
    if current.is_default {
        return Err(AppError::BadRequest(
            "Fontes padrão não podem ser excluídas.".into(),
        ));
    }

    app_state.source_repo.delete(id).await?;
    Ok(ok_message("Fonte excluída com sucesso."))
}
