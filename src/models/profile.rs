// src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. UserRole (O "Papel" da conta)
// ---
// Exatamente um papel por conta, decidido no registro pela chave de acesso
// e imutável depois disso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Customer,
    Staff,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::Staff => "staff",
            UserRole::Admin => "admin",
        }
    }
}

// ---
// 2. Profile (O perfil de negócio)
// ---
// Um por conta. O campo `role` é escrito uma única vez, na criação;
// atualizações posteriores só tocam nome e telefone.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub role: UserRole,
    // Afinidade de filial (obrigatória na prática para staff)
    pub branch_id: Option<Uuid>,
    pub full_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Atualização pós-registro: só os campos de contato. O papel e a
// afinidade de filial não passam por aqui.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    #[validate(length(min = 1, message = "O nome completo é obrigatório."))]
    pub full_name: String,
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_as_str_matches_db_labels() {
        assert_eq!(UserRole::Customer.as_str(), "customer");
        assert_eq!(UserRole::Staff.as_str(), "staff");
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }
}
