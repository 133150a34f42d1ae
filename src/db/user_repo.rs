// src/db/user_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Cria um membro da equipe (senha opcional: contas federadas não têm).
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
        google_id: Option<&str>,
        role: UserRole,
        phone: Option<&str>,
        zone: Option<&str>,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, google_id, role, phone, zone)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(google_id)
        .bind(role)
        .bind(phone)
        .bind(zone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("O e-mail '{}' já está em uso.", email));
                }
            }
            e.into()
        })
    }

    /// Associa o google_id a uma conta pré-existente (primeiro login federado).
    pub async fn link_google_id(&self, user_id: Uuid, google_id: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET google_id = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(google_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Usuários ativos de um conjunto de papéis (destinatários de broadcast).
    pub async fn list_active_by_roles(&self, roles: &[UserRole]) -> Result<Vec<User>, AppError> {
        let slugs: Vec<&str> = roles.iter().map(UserRole::as_str).collect();

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_active = TRUE AND role = ANY($1)",
        )
        .bind(&slugs)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Insere o id na coleção do agente, sem duplicar (insert idempotente).
    pub async fn append_assigned_customer(
        &self,
        agent_id: Uuid,
        customer_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET assigned_customers = array_append(assigned_customers, $2), updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(assigned_customers))
            "#,
        )
        .bind(agent_id)
        .bind(customer_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_assigned_customer(
        &self,
        agent_id: Uuid,
        customer_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET assigned_customers = array_remove(assigned_customers, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(agent_id)
        .bind(customer_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn append_assigned_property(
        &self,
        agent_id: Uuid,
        property_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET assigned_properties = array_append(assigned_properties, $2), updated_at = NOW()
            WHERE id = $1 AND NOT ($2 = ANY(assigned_properties))
            "#,
        )
        .bind(agent_id)
        .bind(property_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_assigned_property(
        &self,
        agent_id: Uuid,
        property_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET assigned_properties = array_remove(assigned_properties, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(agent_id)
        .bind(property_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
