// src/handlers/upload.rs

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use crate::{
    common::{error::AppError, ok, ok_message},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    services::upload_service::MAX_FILES_PER_REQUEST,
};

// POST /api/upload/images — até 10 imagens por requisição
pub async fn upload_images(
    State(app_state): State<AppState>,
    AuthenticatedUser(_actor): AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut urls = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart inválido: {}", e)))?
    {
        if urls.len() >= MAX_FILES_PER_REQUEST {
            return Err(AppError::BadRequest(
                "No máximo 10 imagens por requisição.".into(),
            ));
        }
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Falha ao ler o arquivo: {}", e)))?;
        let url = app_state
            .upload_service
            .save_image(&content_type, &data)
            .await?;
        urls.push(url);
    }

    if urls.is_empty() {
        return Err(AppError::BadRequest("Nenhum arquivo enviado.".into()));
    }
    Ok((StatusCode::CREATED, ok(urls)))
}

// GET /api/upload/images
pub async fn list_images(
    State(app_state): State<AppState>,
    AuthenticatedUser(_actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let urls = app_state.upload_service.list_images().await?;
    Ok(ok(urls))
}

// DELETE /api/upload/images/{filename}
pub async fn delete_image(
    State(app_state): State<AppState>,
    AuthenticatedUser(_actor): AuthenticatedUser,
    Path(filename): Path<String>,
) -> Result<Json<Value>, AppError> {
    app_state.upload_service.delete_image(&filename).await?;
    Ok(ok_message("Arquivo removido."))
}
