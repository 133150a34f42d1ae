// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// 1. O Trait que define um nível de acesso
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
    fn describe() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if !T::allows(user.role) {
            return Err(AppError::Forbidden(format!(
                "Esta ação requer nível de acesso '{}'.",
                T::describe()
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS NÍVEIS DE ACESSO (TIPOS)
// ---

pub struct AdminRole;
impl RoleDef for AdminRole {
    fn allows(role: UserRole) -> bool {
        role.is_admin()
    }
    fn describe() -> &'static str {
        "admin"
    }
}

pub struct SuperAdminRole;
impl RoleDef for SuperAdminRole {
    fn allows(role: UserRole) -> bool {
        role == UserRole::SuperAdmin
    }
    fn describe() -> &'static str {
        "super_admin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn niveis_de_acesso_por_papel() {
        assert!(AdminRole::allows(UserRole::Admin));
        assert!(AdminRole::allows(UserRole::SuperAdmin));
        assert!(!AdminRole::allows(UserRole::Agent));

        assert!(SuperAdminRole::allows(UserRole::SuperAdmin));
        assert!(!SuperAdminRole::allows(UserRole::Admin));
    }
}
