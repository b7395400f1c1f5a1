// src/middleware/auth.rs

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::User, profile::Profile},
};

// O guardião de autenticação, como extrator: valida o token Bearer e
// resolve a conta E o perfil frescos do banco a cada requisição. O
// papel nunca vem de cache nem de estado global compartilhado.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub account: User,
    pub profile: Profile,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::InvalidToken)?;

        let (account, profile) = app_state
            .auth_service
            .validate_token(bearer.token())
            .await?;

        Ok(AuthenticatedUser { account, profile })
    }
}
