// src/db/notification_repo.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        customer::Priority,
        notification::{Notification, NotificationListQuery, NotificationType, RelatedEntity},
    },
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Emissão em massa: um registro por destinatário.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_for_recipients(
        &self,
        recipients: &[Uuid],
        notification_type: NotificationType,
        title: &str,
        message: &str,
        priority: Priority,
        related_entity: Option<&RelatedEntity>,
        action_url: Option<&str>,
        metadata: Option<&Value>,
    ) -> Result<u64, AppError> {
        let mut inserted = 0;
        for recipient in recipients {
            let result = sqlx::query(
                r#"
                INSERT INTO notifications (
                    recipient_id, notification_type, title, message,
                    priority, related_entity, action_url, metadata
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(recipient)
            .bind(notification_type)
            .bind(title)
            .bind(message)
            .bind(priority)
            .bind(related_entity.map(|r| Json(r.clone())))
            .bind(action_url)
            .bind(metadata)
            .execute(&self.pool)
            .await?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }

    /// Instante da última notificação do mesmo tipo referenciando a mesma
    /// entidade. O serviço decide a janela de supressão.
    pub async fn last_emitted_for_entity(
        &self,
        notification_type: NotificationType,
        entity_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        let last: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT MAX(created_at) FROM notifications
            WHERE notification_type = $1
              AND related_entity->>'entityId' = $2
            "#,
        )
        .bind(notification_type)
        .bind(entity_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(last)
    }

    pub async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        q: &NotificationListQuery,
    ) -> Result<Vec<Notification>, AppError> {
        let limit = q.limit.unwrap_or(20).clamp(1, 100);
        let offset = (q.page.unwrap_or(1).max(1) - 1) * limit;

        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE recipient_id = $1 AND ($2::bool IS NOT TRUE OR is_read = FALSE)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(recipient_id)
        .bind(q.unread_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn unread_count(&self, recipient_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Marca como lida. Só o destinatário pode mexer na própria notificação.
    pub async fn mark_read(
        &self,
        id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET is_read = TRUE, updated_at = NOW()
            WHERE id = $1 AND recipient_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;
        notification.ok_or(AppError::NotFound("Notificação"))
    }

    pub async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, updated_at = NOW() \
             WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid, recipient_id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("DELETE FROM notifications WHERE id = $1 AND recipient_id = $2")
                .bind(id)
                .bind(recipient_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notificação"));
        }
        Ok(())
    }

    pub async fn clear_read(&self, recipient_id: Uuid) -> Result<u64, AppError> {
        let result =
            sqlx::query("DELETE FROM notifications WHERE recipient_id = $1 AND is_read = TRUE")
                .bind(recipient_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
