// src/handlers/access_keys.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::roles::RequireAdmin,
    models::access_key::{
        AccessKey, ConsumeKeyPayload, ConsumeKeyResponse, CreateKeyPayload, ValidateKeyPayload,
        ValidateKeyResponse,
    },
};

// POST /api/access-keys/validate
//
// Checagem pura contra o estado atual da chave. Nunca mexe em
// contadores; quem consome uso é a rota de consumo.
#[utoipa::path(
    post,
    path = "/api/access-keys/validate",
    tag = "Access Keys",
    request_body = ValidateKeyPayload,
    responses(
        (status = 200, description = "Resultado da validação (valid=true/false)", body = ValidateKeyResponse)
    )
)]
pub async fn validate_key(
    State(app_state): State<AppState>,
    Json(payload): Json<ValidateKeyPayload>,
) -> Result<Json<ValidateKeyResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .access_key_service
        .validate(&payload.access_key, payload.role)
        .await?;

    Ok(Json(outcome))
}

// POST /api/access-keys/consume
//
// Consumo avulso, para chamadores que criam a conta por fora e só
// depois confirmam o uso. O registro via /api/auth/register não passa
// por aqui: lá o consumo participa da transação do registro.
#[utoipa::path(
    post,
    path = "/api/access-keys/consume",
    tag = "Access Keys",
    request_body = ConsumeKeyPayload,
    responses(
        (status = 200, description = "Resultado do consumo (success=true/false)", body = ConsumeKeyResponse)
    )
)]
pub async fn consume_key(
    State(app_state): State<AppState>,
    Json(payload): Json<ConsumeKeyPayload>,
) -> Result<Json<ConsumeKeyResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .access_key_service
        .consume(&payload.access_key, None)
        .await?;

    Ok(Json(outcome))
}

// POST /api/access-keys (admin)
#[utoipa::path(
    post,
    path = "/api/access-keys",
    tag = "Access Keys",
    request_body = CreateKeyPayload,
    responses(
        (status = 201, description = "Chave provisionada", body = AccessKey),
        (status = 403, description = "Requer papel admin"),
        (status = 409, description = "Já existe chave com esse valor")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_key(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateKeyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let key = app_state.access_key_service.create_key(payload).await?;

    Ok((StatusCode::CREATED, Json(key)))
}

// GET /api/access-keys (admin)
#[utoipa::path(
    get,
    path = "/api/access-keys",
    tag = "Access Keys",
    responses(
        (status = 200, description = "Todas as chaves, mais recentes primeiro", body = Vec<AccessKey>),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_keys(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<AccessKey>>, AppError> {
    let keys = app_state.access_key_service.list_keys().await?;
    Ok(Json(keys))
}

// POST /api/access-keys/{id}/deactivate (admin)
//
// Chaves nunca são apagadas, apenas desativadas.
#[utoipa::path(
    post,
    path = "/api/access-keys/{id}/deactivate",
    tag = "Access Keys",
    params(("id" = Uuid, Path, description = "ID da chave")),
    responses(
        (status = 200, description = "Chave desativada", body = AccessKey),
        (status = 403, description = "Requer papel admin"),
        (status = 404, description = "Chave não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_key(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<AccessKey>, AppError> {
    let key = app_state.access_key_service.deactivate_key(id).await?;
    Ok(Json(key))
}
