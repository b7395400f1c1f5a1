// src/models/access_key.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::profile::UserRole;

// ---
// 1. AccessKey (A chave de acesso)
// ---
// Token pré-provisionado que define qual papel uma nova conta pode assumir.
// Nunca é apagada, apenas desativada; `current_uses` só cresce.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessKey {
    pub id: Uuid,
    pub key_value: String,
    pub name: String,
    pub role: UserRole,
    // NULL = usos ilimitados
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. InvalidKeyReason (Por que a chave foi recusada)
// ---
// Recusa de chave é um resultado de negócio esperado, nunca um erro 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvalidKeyReason {
    NotFound,
    Inactive,
    RoleMismatch,
    Exhausted,
}

impl InvalidKeyReason {
    pub fn message(&self) -> &'static str {
        match self {
            InvalidKeyReason::NotFound => "Chave de acesso não encontrada.",
            InvalidKeyReason::Inactive => "Esta chave de acesso foi desativada.",
            InvalidKeyReason::RoleMismatch => {
                "Esta chave de acesso não vale para o papel solicitado."
            }
            InvalidKeyReason::Exhausted => "Esta chave de acesso já atingiu o limite de usos.",
        }
    }
}

impl AccessKey {
    /// Checagem pura de elegibilidade: a mesma regra vale no `validate`
    /// (leitura) e é re-checada no banco pelo UPDATE condicional do consumo.
    pub fn eligibility(&self, requested_role: UserRole) -> Result<(), InvalidKeyReason> {
        if !self.is_active {
            return Err(InvalidKeyReason::Inactive);
        }
        if self.role != requested_role {
            return Err(InvalidKeyReason::RoleMismatch);
        }
        if let Some(max) = self.max_uses {
            if self.current_uses >= max {
                return Err(InvalidKeyReason::Exhausted);
            }
        }
        Ok(())
    }
}

// ---
// 3. Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyPayload {
    #[validate(length(min = 1, message = "A chave de acesso é obrigatória."))]
    pub access_key: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeKeyPayload {
    #[validate(length(min = 1, message = "A chave de acesso é obrigatória."))]
    pub access_key: String,
}

// Provisionamento (rota de admin)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyPayload {
    #[validate(length(min = 1, message = "O nome da chave é obrigatório."))]
    pub name: String,
    // Se omitido, o servidor gera um valor opaco.
    pub key_value: Option<String>,
    pub role: UserRole,
    #[validate(range(min = 1, message = "O limite de usos deve ser positivo."))]
    pub max_uses: Option<i32>,
}

// ---
// 4. Respostas
// ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<InvalidKeyReason>,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeKeyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_use_count: Option<i32>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn key(role: UserRole, max_uses: Option<i32>, current_uses: i32, is_active: bool) -> AccessKey {
        AccessKey {
            id: Uuid::new_v4(),
            key_value: "CHAVE-TESTE".into(),
            name: "Chave de teste".into(),
            role,
            max_uses,
            current_uses,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn accepts_active_key_with_remaining_uses() {
        let k = key(UserRole::Staff, Some(3), 2, true);
        assert!(k.eligibility(UserRole::Staff).is_ok());
    }

    #[test]
    fn accepts_unlimited_key_regardless_of_count() {
        let k = key(UserRole::Customer, None, 10_000, true);
        assert!(k.eligibility(UserRole::Customer).is_ok());
    }

    #[test]
    fn rejects_inactive_key() {
        let k = key(UserRole::Staff, Some(3), 0, false);
        assert_eq!(k.eligibility(UserRole::Staff), Err(InvalidKeyReason::Inactive));
    }

    #[test]
    fn rejects_role_mismatch() {
        // Uma chave emitida para "staff" não eleva um pedido de "admin".
        let k = key(UserRole::Staff, None, 0, true);
        assert_eq!(k.eligibility(UserRole::Admin), Err(InvalidKeyReason::RoleMismatch));
    }

    #[test]
    fn rejects_exhausted_key() {
        let k = key(UserRole::Customer, Some(1), 1, true);
        assert_eq!(
            k.eligibility(UserRole::Customer),
            Err(InvalidKeyReason::Exhausted)
        );
    }

    #[test]
    fn inactive_wins_over_exhausted() {
        let k = key(UserRole::Customer, Some(1), 1, false);
        assert_eq!(
            k.eligibility(UserRole::Customer),
            Err(InvalidKeyReason::Inactive)
        );
    }
}
