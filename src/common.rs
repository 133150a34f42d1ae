pub mod error;

use axum::Json;
use serde::Serialize;
use serde_json::{Value, json};

/// Envelope de sucesso padrão: { success: true, data }.
pub fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

/// Envelope de sucesso para contagens: { success: true, count }.
pub fn ok_count(count: i64) -> Json<Value> {
    Json(json!({ "success": true, "count": count }))
}

/// Envelope de sucesso sem corpo útil: { success: true, message }.
pub fn ok_message(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}
