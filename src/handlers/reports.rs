// src/handlers/reports.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, ok},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::report::{ReportListQuery, ReviewReportPayload, SubmitReportPayload},
};

// POST /api/reports — reenvio no mesmo dia atualiza o registro existente
pub async fn submit_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<SubmitReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let report = app_state.report_service.submit(&actor, payload).await?;
    Ok((StatusCode::CREATED, ok(report)))
}

// GET /api/reports — todos (super-admin)
pub async fn list_reports(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<Value>, AppError> {
    let reports = app_state.report_service.list_all(&actor, &query).await?;
    Ok(ok(reports))
}

// GET /api/reports/zone — relatórios dos agentes da zona do admin
pub async fn list_zone_reports(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let reports = app_state.report_service.list_zone(&actor).await?;
    Ok(ok(reports))
}

// GET /api/reports/my
pub async fn my_reports(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<Value>, AppError> {
    let reports = app_state.report_service.list_mine(&actor, &query).await?;
    Ok(ok(reports))
}

// GET /api/reports/today — o cliente web usa hasSubmittedToday para o banner
pub async fn today_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let report = app_state.report_service.today(&actor).await?;
    Ok(Json(json!({
        "success": true,
        "hasSubmittedToday": report.is_some(),
        "data": report,
    })))
}

// PATCH /api/reports/{id}/review
pub async fn review_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewReportPayload>,
) -> Result<Json<Value>, AppError> {
    let report = app_state
        .report_service
        .review(&actor, id, payload)
        .await?;
    Ok(ok(report))
}

// GET /api/reports/stats
pub async fn report_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let stats = app_state.report_service.stats(&actor).await?;
    Ok(ok(stats))
}
