//src/main.rs

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_middleware;

// GET /api/health — sonda o banco de verdade em vez de confiar em flag
async fn health(State(app_state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    if app_state.db_healthy().await {
        (StatusCode::OK, Json(json!({ "success": true, "database": "up" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "success": false, "database": "down" })),
        )
    }
}

#[tokio::main]
async fn main() {
    // Inicializa o logger, que movemos para o main.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Com a tabela de usuários vazia, cria o super-admin inicial
    if let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        app_state
            .auth_service
            .bootstrap_admin(&email, &password)
            .await
            .expect("Falha ao criar o super-admin inicial.");
    }

    // Rotas de autenticação públicas
    let auth_public_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/google", post(handlers::auth::google_login));

    // Rotas de autenticação protegidas (cadastro exige super-admin logado)
    let auth_protected_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/me", get(handlers::auth::get_me));

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route("/my/customers", get(handlers::customers::my_customers))
        .route(
            "/foreign/customers",
            get(handlers::customers::foreign_customers),
        )
        .route("/follow-ups/due", get(handlers::customers::due_follow_ups))
        .route(
            "/follow-ups/due/count",
            get(handlers::customers::due_follow_ups_count),
        )
        .route(
            "/{id}",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route(
            "/{id}/assign-agent",
            patch(handlers::customers::assign_agent),
        )
        .route("/{id}/notes", post(handlers::customers::add_note))
        .route("/{id}/move", put(handlers::customers::move_customer))
        .route("/{id}/agent-close", put(handlers::customers::agent_close))
        .route("/{id}/reopen", put(handlers::customers::reopen_customer));

    let property_routes = Router::new()
        .route("/", post(handlers::properties::create_property))
        .route(
            "/{id}",
            put(handlers::properties::update_property)
                .delete(handlers::properties::delete_property),
        )
        .route(
            "/{id}/publish",
            patch(handlers::properties::publish_property),
        )
        .route(
            "/{id}/assign-agent",
            patch(handlers::properties::assign_agent),
        );

    // Listagem e detalhe de imóveis são públicos (vitrine do site)
    let property_public_routes = Router::new()
        .route("/", get(handlers::properties::list_properties))
        .route("/{id}", get(handlers::properties::get_property));

    let visit_routes = Router::new()
        .route(
            "/",
            post(handlers::visits::create_visit).get(handlers::visits::list_visits),
        )
        .route("/stats/today", get(handlers::visits::stats_today))
        .route("/stats/monthly", get(handlers::visits::stats_monthly))
        .route("/stats/total", get(handlers::visits::stats_total))
        .route(
            "/{id}",
            get(handlers::visits::get_visit)
                .put(handlers::visits::update_visit)
                .delete(handlers::visits::delete_visit),
        );

    let report_routes = Router::new()
        .route(
            "/",
            post(handlers::reports::submit_report).get(handlers::reports::list_reports),
        )
        .route("/zone", get(handlers::reports::list_zone_reports))
        .route("/my", get(handlers::reports::my_reports))
        .route("/today", get(handlers::reports::today_report))
        .route("/stats", get(handlers::reports::report_stats))
        .route("/{id}/review", patch(handlers::reports::review_report));

    let notification_routes = Router::new()
        .route("/", get(handlers::notifications::list_notifications))
        .route("/unread/count", get(handlers::notifications::unread_count))
        .route("/read-all", patch(handlers::notifications::mark_all_read))
        .route("/clear-read", delete(handlers::notifications::clear_read))
        .route(
            "/missed-followup",
            post(handlers::notifications::report_missed_followup),
        )
        .route("/{id}/read", patch(handlers::notifications::mark_read))
        .route("/{id}", delete(handlers::notifications::delete_notification));

    let source_routes = Router::new()
        .route(
            "/",
            get(handlers::sources::list_sources).post(handlers::sources::create_source),
        )
        .route(
            "/{id}",
            put(handlers::sources::update_source).delete(handlers::sources::delete_source),
        );

    let upload_routes = Router::new()
        .route(
            "/images",
            post(handlers::upload::upload_images).get(handlers::upload::list_images),
        )
        .route("/images/{filename}", delete(handlers::upload::delete_image));

    // Tudo que exige usuário logado passa pelo middleware de autenticação
    let protected = Router::new()
        .nest("/api/auth", auth_protected_routes)
        .nest("/api/customers", customer_routes)
        .nest("/api/properties", property_routes)
        .nest("/api/visits", visit_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/notifications", notification_routes)
        .nest("/api/sources", source_routes)
        .nest("/api/upload", upload_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_public_routes)
        .nest("/api/properties", property_public_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .nest_service(
            "/uploads",
            ServeDir::new(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into())),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Inicia o servidor
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
