// src/handlers/visits.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::{error::AppError, ok, ok_message},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::visit::{CreateVisitPayload, UpdateVisitPayload, VisitListQuery},
};

// POST /api/visits — o código V-YYYYMMDD-NNNN é gerado aqui
pub async fn create_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateVisitPayload>,
) -> Result<impl IntoResponse, AppError> {
    let visit = app_state.visit_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, ok(visit)))
}

// GET /api/visits
pub async fn list_visits(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<VisitListQuery>,
) -> Result<Json<Value>, AppError> {
    let visits = app_state.visit_service.list(&actor, &query).await?;
    Ok(ok(visits))
}

// GET /api/visits/{id}
pub async fn get_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let visit = app_state.visit_service.get(&actor, id).await?;
    Ok(ok(visit))
}

// PUT /api/visits/{id} — concluir a visita reflete no cliente
pub async fn update_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVisitPayload>,
) -> Result<Json<Value>, AppError> {
    let visit = app_state.visit_service.update(&actor, id, payload).await?;
    Ok(ok(visit))
}

// DELETE /api/visits/{id}
pub async fn delete_visit(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.visit_service.delete(&actor, id).await?;
    Ok(ok_message("Visita excluída com sucesso."))
}

// GET /api/visits/stats/today
pub async fn stats_today(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let stats = app_state.visit_service.stats_today(&actor).await?;
    Ok(ok(stats))
}

// GET /api/visits/stats/monthly
pub async fn stats_monthly(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let stats = app_state.visit_service.stats_monthly(&actor).await?;
    Ok(ok(stats))
}

// GET /api/visits/stats/total
pub async fn stats_total(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let stats = app_state.visit_service.stats_total(&actor).await?;
    Ok(ok(stats))
}
