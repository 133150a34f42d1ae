// src/handlers/notifications.rs

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::{error::AppError, ok, ok_count, ok_message},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::notification::{MissedFollowupPayload, NotificationListQuery},
};

// GET /api/notifications — só as do chamador
pub async fn list_notifications(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<NotificationListQuery>,
) -> Result<Json<Value>, AppError> {
    let notifications = app_state
        .notification_repo
        .list_for_recipient(actor.id, &query)
        .await?;
    Ok(ok(notifications))
}

// GET /api/notifications/unread/count — badge do cliente web
pub async fn unread_count(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let count = app_state.notification_repo.unread_count(actor.id).await?;
    Ok(ok_count(count))
}

// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let notification = app_state.notification_repo.mark_read(id, actor.id).await?;
    Ok(ok(notification))
}

// PATCH /api/notifications/read-all
pub async fn mark_all_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let updated = app_state.notification_repo.mark_all_read(actor.id).await?;
    Ok(ok_count(updated as i64))
}

// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.notification_repo.delete(id, actor.id).await?;
    Ok(ok_message("Notificação excluída."))
}

// DELETE /api/notifications/clear-read
pub async fn clear_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let removed = app_state.notification_repo.clear_read(actor.id).await?;
    Ok(ok_count(removed as i64))
}

// POST /api/notifications/missed-followup — alerta deduplicado em 24h
pub async fn report_missed_followup(
    State(app_state): State<AppState>,
    AuthenticatedUser(_actor): AuthenticatedUser,
    Json(payload): Json<MissedFollowupPayload>,
) -> Result<Json<Value>, AppError> {
    app_state
        .customer_service
        .report_missed_followup(payload.customer_id)
        .await?;
    Ok(ok_message("Alerta de follow-up registrado."))
}
