// src/services/access_key_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccessKeyRepository,
    models::{
        access_key::{
            AccessKey, ConsumeKeyResponse, CreateKeyPayload, InvalidKeyReason, ValidateKeyResponse,
        },
        profile::UserRole,
    },
};

// A autoridade das chaves de acesso: decide se uma chave vale para um
// papel e consome usos. Recusa de chave é resultado tipado, nunca erro.
#[derive(Clone)]
pub struct AccessKeyService {
    key_repo: AccessKeyRepository,
    pool: PgPool,
}

impl AccessKeyService {
    pub fn new(key_repo: AccessKeyRepository, pool: PgPool) -> Self {
        Self { key_repo, pool }
    }

    /// Checagem pura contra o estado atual da chave. Não mexe em nada;
    /// quem consome uso é o `consume`, e só ele.
    pub async fn validate(
        &self,
        key_value: &str,
        requested_role: UserRole,
    ) -> Result<ValidateKeyResponse, AppError> {
        let Some(key) = self.key_repo.find_by_value(key_value).await? else {
            return Ok(ValidateKeyResponse {
                valid: false,
                key_name: None,
                reason: Some(InvalidKeyReason::NotFound),
                message: InvalidKeyReason::NotFound.message().to_string(),
            });
        };

        match key.eligibility(requested_role) {
            Ok(()) => Ok(ValidateKeyResponse {
                valid: true,
                key_name: Some(key.name),
                reason: None,
                message: "Chave de acesso válida.".to_string(),
            }),
            Err(reason) => Ok(ValidateKeyResponse {
                valid: false,
                key_name: None,
                reason: Some(reason),
                message: reason.message().to_string(),
            }),
        }
    }

    /// Consome um uso da chave. O UPDATE condicional re-checa as condições
    /// no commit, então este caminho é seguro mesmo com a mesma chave sendo
    /// consumida em paralelo.
    pub async fn consume(
        &self,
        key_value: &str,
        expected_role: Option<UserRole>,
    ) -> Result<ConsumeKeyResponse, AppError> {
        let consumed = self
            .key_repo
            .consume(&self.pool, key_value, expected_role)
            .await?;

        if let Some(new_use_count) = consumed {
            return Ok(ConsumeKeyResponse {
                success: true,
                new_use_count: Some(new_use_count),
                message: "Uso registrado.".to_string(),
            });
        }

        // O UPDATE não afetou nenhuma linha. Relê a chave só para devolver
        // um motivo legível; o resultado do consumo em si já está decidido.
        let reason = match self.key_repo.find_by_value(key_value).await? {
            None => InvalidKeyReason::NotFound,
            Some(key) => key
                .eligibility(expected_role.unwrap_or(key.role))
                .err()
                .unwrap_or(InvalidKeyReason::Exhausted),
        };

        Ok(ConsumeKeyResponse {
            success: false,
            new_use_count: None,
            message: reason.message().to_string(),
        })
    }

    // --- Provisionamento (admin) ---

    pub async fn create_key(&self, payload: CreateKeyPayload) -> Result<AccessKey, AppError> {
        // Valor opaco gerado no servidor quando o admin não informa um.
        let key_value = payload
            .key_value
            .unwrap_or_else(|| format!("KEY-{}", Uuid::new_v4().simple()).to_uppercase());

        self.key_repo
            .create_key(
                &self.pool,
                &key_value,
                &payload.name,
                payload.role,
                payload.max_uses,
            )
            .await
    }

    pub async fn deactivate_key(&self, id: Uuid) -> Result<AccessKey, AppError> {
        self.key_repo.deactivate(&self.pool, id).await
    }

    pub async fn list_keys(&self) -> Result<Vec<AccessKey>, AppError> {
        self.key_repo.list_keys().await
    }
}
