// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, path::PathBuf, time::Duration};

use crate::{
    db::{
        CustomerRepository, NotificationRepository, PropertyRepository, ReportRepository,
        SequenceRepository, SourceRepository, UserRepository, VisitRepository,
    },
    services::{
        AuthService, CustomerService, Notifier, PropertyService, ReportService, UploadService,
        VisitService,
    },
};

// Tentativas de conexão na subida (o banco pode demorar a aceitar conexões
// em ambientes orquestrados)
const CONNECT_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub customer_service: CustomerService,
    pub property_service: PropertyService,
    pub visit_service: VisitService,
    pub report_service: ReportService,
    pub upload_service: UploadService,
    pub source_repo: SourceRepository,
    pub notification_repo: NotificationRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;
        let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        let upload_dir = PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
        let code_prefix = env::var("PROPERTY_CODE_PREFIX").unwrap_or_else(|_| "PROP".into());

        let db_pool = Self::connect_with_retry(&database_url).await?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let property_repo = PropertyRepository::new(db_pool.clone());
        let visit_repo = VisitRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let source_repo = SourceRepository::new(db_pool.clone());
        let sequence_repo = SequenceRepository::new(db_pool.clone());

        let notifier = Notifier::new(user_repo.clone(), notification_repo.clone());
        let auth_service = AuthService::new(user_repo.clone(), jwt_secret, google_client_id);
        let customer_service = CustomerService::new(
            customer_repo.clone(),
            user_repo.clone(),
            visit_repo.clone(),
            source_repo.clone(),
            notifier.clone(),
        );
        let property_service = PropertyService::new(
            property_repo,
            user_repo,
            sequence_repo.clone(),
            notifier,
            code_prefix,
        );
        let visit_service = VisitService::new(visit_repo, customer_repo, sequence_repo);
        let report_service = ReportService::new(report_repo);
        let upload_service = UploadService::new(upload_dir);

        Ok(Self {
            db_pool,
            auth_service,
            customer_service,
            property_service,
            visit_service,
            report_service,
            upload_service,
            source_repo,
            notification_repo,
        })
    }

    // Backoff simples: 1s, 2s, 3s... entre as tentativas
    async fn connect_with_retry(database_url: &str) -> anyhow::Result<PgPool> {
        let mut last_err = None;
        for attempt in 1..=CONNECT_ATTEMPTS {
            match PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(pool),
                Err(e) => {
                    tracing::warn!(
                        "Banco indisponível (tentativa {}/{}): {}",
                        attempt,
                        CONNECT_ATTEMPTS,
                        e
                    );
                    last_err = Some(e);
                    if attempt < CONNECT_ATTEMPTS {
                        tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                    }
                }
            }
        }
        Err(anyhow::anyhow!(
            "Não foi possível conectar ao banco de dados: {}",
            last_err.map(|e| e.to_string()).unwrap_or_default()
        ))
    }

    /// Sonda de saúde: executa uma consulta real em vez de confiar em flag.
    pub async fn db_healthy(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .is_ok()
    }
}
