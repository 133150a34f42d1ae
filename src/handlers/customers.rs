// src/handlers/customers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, ok, ok_count, ok_message},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::customer::{
        AddNotePayload, AgentClosePayload, AssignAgentPayload, CreateCustomerPayload,
        Customer, CustomerDetail, CustomerListQuery, MoveCustomerPayload, UpdateCustomerPayload,
    },
};

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Customer)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let customer = app_state.customer_service.create(&actor, payload).await?;
    Ok((StatusCode::CREATED, ok(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Lista de clientes visíveis ao chamador", body = [Customer])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(query): Query<CustomerListQuery>,
) -> Result<Json<Value>, AppError> {
    let customers = app_state.customer_service.list(&actor, &query).await?;
    Ok(ok(customers))
}

// GET /api/customers/my/customers
pub async fn my_customers(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let customers = app_state.customer_service.my_customers(&actor).await?;
    Ok(ok(customers))
}

// GET /api/customers/foreign/customers
pub async fn foreign_customers(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let customers = app_state.customer_service.foreign_customers(&actor).await?;
    Ok(ok(customers))
}

// GET /api/customers/follow-ups/due
pub async fn due_follow_ups(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let customers = app_state.customer_service.due_follow_ups(&actor).await?;
    Ok(ok(customers))
}

// GET /api/customers/follow-ups/due/count
pub async fn due_follow_ups_count(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
) -> Result<Json<Value>, AppError> {
    let count = app_state
        .customer_service
        .due_follow_ups_count(&actor)
        .await?;
    Ok(ok_count(count))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Detalhe com notas e visitas", body = CustomerDetail),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let detail = app_state.customer_service.get_detail(&actor, id).await?;
    Ok(ok(detail))
}

// PUT /api/customers/{id}
#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = UpdateCustomerPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerPayload>,
) -> Result<Json<Value>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let customer = app_state
        .customer_service
        .update(&actor, id, payload)
        .await?;
    Ok(ok(customer))
}

// DELETE /api/customers/{id}
pub async fn delete_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    app_state.customer_service.delete(&actor, id).await?;
    Ok(ok_message("Cliente excluído com sucesso."))
}

// PATCH /api/customers/{id}/assign-agent
pub async fn assign_agent(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignAgentPayload>,
) -> Result<Json<Value>, AppError> {
    let customer = app_state
        .customer_service
        .assign_agent(&actor, id, payload.agent_id)
        .await?;
    Ok(ok(customer))
}

// POST /api/customers/{id}/notes
pub async fn add_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddNotePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let note = app_state
        .customer_service
        .add_note(&actor, id, payload)
        .await?;
    Ok((StatusCode::CREATED, ok(note)))
}

// PUT /api/customers/{id}/move
pub async fn move_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveCustomerPayload>,
) -> Result<Json<Value>, AppError> {
    let customer = app_state
        .customer_service
        .move_customer(&actor, id, payload)
        .await?;
    Ok(ok(customer))
}

// PUT /api/customers/{id}/agent-close
pub async fn agent_close(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AgentClosePayload>,
) -> Result<Json<Value>, AppError> {
    let customer = app_state
        .customer_service
        .agent_close(&actor, id, payload)
        .await?;
    Ok(ok(customer))
}

// PUT /api/customers/{id}/reopen
pub async fn reopen_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let customer = app_state.customer_service.reopen(&actor, id).await?;
    Ok(ok(customer))
}
