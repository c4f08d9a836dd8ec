// src/middleware/rbac.rs
//
// Autorização por papel com tipos, em vez de comparação de string
// espalhada pelos guards: cada requisito devolve um Access explícito
// (Granted/Denied) e o extrator só traduz Denied em 403.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::profile::UserRole};

/// Resultado explícito da checagem de permissão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied { required: &'static str },
}

impl Access {
    pub fn is_granted(self) -> bool {
        matches!(self, Access::Granted)
    }
}

/// 1. O Trait que define o que é um requisito de papel
pub trait RoleRequirement: Send + Sync + 'static {
    fn check(role: UserRole) -> Access;
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // O auth_guard já rodou e deixou o perfil nas extensions.
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        match T::check(user.0.role) {
            Access::Granted => Ok(RequireRole(PhantomData)),
            Access::Denied { required } => Err(AppError::AccessDenied { required }),
        }
    }
}

// ---
// DEFINIÇÃO DOS REQUISITOS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleRequirement for AdminOnly {
    fn check(role: UserRole) -> Access {
        match role {
            UserRole::Admin => Access::Granted,
            _ => Access::Denied { required: "ADMIN" },
        }
    }
}

pub struct PartnerOrAdmin;
impl RoleRequirement for PartnerOrAdmin {
    fn check(role: UserRole) -> Access {
        match role {
            UserRole::Admin | UserRole::Partner => Access::Granted,
            _ => Access::Denied { required: "PARTNER" },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_only_denies_everyone_else() {
        assert!(AdminOnly::check(UserRole::Admin).is_granted());
        assert_eq!(
            AdminOnly::check(UserRole::Partner),
            Access::Denied { required: "ADMIN" }
        );
        assert_eq!(
            AdminOnly::check(UserRole::Customer),
            Access::Denied { required: "ADMIN" }
        );
    }

    #[test]
    fn partner_routes_accept_admins_too() {
        assert!(PartnerOrAdmin::check(UserRole::Partner).is_granted());
        assert!(PartnerOrAdmin::check(UserRole::Admin).is_granted());
        assert!(!PartnerOrAdmin::check(UserRole::Customer).is_granted());
    }
}
