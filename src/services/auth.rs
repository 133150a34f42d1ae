// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, RegisterUserPayload, User, UserRole},
};

// Resposta do endpoint tokeninfo do Google (apenas os campos que usamos)
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    aud: String,
    sub: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    google_client_id: String,
    http: reqwest::Client,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, google_client_id: String) -> Self {
        Self {
            user_repo,
            jwt_secret,
            google_client_id,
            http: reqwest::Client::new(),
        }
    }

    /// Cadastro de um membro da equipe. Apenas o super-admin cria contas.
    pub async fn register_user(
        &self,
        actor: &User,
        payload: RegisterUserPayload,
    ) -> Result<AuthResponse, AppError> {
        if actor.role != UserRole::SuperAdmin {
            return Err(AppError::Forbidden(
                "Apenas o super-admin pode cadastrar membros da equipe.".into(),
            ));
        }

        let password = payload.password.clone();
        let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let user = self
            .user_repo
            .create_user(
                &payload.name,
                &payload.email,
                Some(&hashed),
                None,
                payload.role.unwrap_or(UserRole::Agent),
                payload.phone.as_deref(),
                payload.zone.as_deref(),
            )
            .await?;

        tracing::info!("✅ Novo membro da equipe cadastrado: {}", user.email);
        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }
        // Contas federadas (só Google) não têm senha local
        let password_hash = user
            .password_hash
            .clone()
            .ok_or(AppError::InvalidCredentials)?;

        let password = password.to_owned();
        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password, &password_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, user })
    }

    /// Login federado: valida o id_token no endpoint tokeninfo do Google,
    /// confere a audiência e emite um JWT nosso. No primeiro login, vincula
    /// o google_id à conta existente ou cria uma conta de agente.
    pub async fn google_login(&self, id_token: &str) -> Result<AuthResponse, AppError> {
        let info = self.verify_google_token(id_token).await?;

        if info.aud != self.google_client_id {
            tracing::warn!("Token do Google com audiência inesperada: {}", info.aud);
            return Err(AppError::InvalidToken);
        }

        let user = match self.user_repo.find_by_email(&info.email).await? {
            Some(existing) if existing.google_id.is_some() => existing,
            Some(existing) => {
                self.user_repo
                    .link_google_id(existing.id, &info.sub)
                    .await?
            }
            None => {
                let name = info.name.clone().unwrap_or_else(|| info.email.clone());
                let user = self
                    .user_repo
                    .create_user(
                        &name,
                        &info.email,
                        None,
                        Some(&info.sub),
                        UserRole::Agent,
                        None,
                        None,
                    )
                    .await?;
                tracing::info!("✅ Conta de agente criada via Google: {}", user.email);
                user
            }
        };

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(user.id)?;
        Ok(AuthResponse { token, user })
    }

    async fn verify_google_token(&self, id_token: &str) -> Result<GoogleTokenInfo, AppError> {
        let response = self
            .http
            .get("https://oauth2.googleapis.com/tokeninfo")
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AppError::Dependency(format!("Google indisponível: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::InvalidToken);
        }
        response
            .json::<GoogleTokenInfo>()
            .await
            .map_err(|_| AppError::InvalidToken)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidToken)
    }

    /// Garante que exista ao menos uma conta: com a tabela vazia, cria o
    /// super-admin inicial a partir das variáveis ADMIN_EMAIL/ADMIN_PASSWORD.
    pub async fn bootstrap_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        if self.user_repo.count_users().await? > 0 {
            return Ok(());
        }

        let password = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.user_repo
            .create_user(
                "Administrador",
                email,
                Some(&hashed),
                None,
                UserRole::SuperAdmin,
                None,
                None,
            )
            .await?;
        tracing::info!("✅ Super-admin inicial criado: {}", email);
        Ok(())
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
