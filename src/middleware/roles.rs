// src/middleware/roles.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::profile::{Profile, UserRole},
};

// Guardiões de papel. São só os três papéis concretos do sistema, nada
// de linguagem genérica de permissões: o extrator autentica e recusa a
// requisição quando o papel do perfil não basta.

/// Exige papel admin.
pub struct RequireAdmin(pub Profile);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = AuthenticatedUser::from_request_parts(parts, state).await?;
        if actor.profile.role != UserRole::Admin {
            return Err(AppError::Forbidden(
                "Esta ação requer papel de administrador.".into(),
            ));
        }
        Ok(RequireAdmin(actor.profile))
    }
}

/// Exige papel staff ou admin.
pub struct RequireStaff(pub Profile);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let actor = AuthenticatedUser::from_request_parts(parts, state).await?;
        if actor.profile.role == UserRole::Customer {
            return Err(AppError::Forbidden(
                "Esta ação requer papel de staff ou administrador.".into(),
            ));
        }
        Ok(RequireStaff(actor.profile))
    }
}
