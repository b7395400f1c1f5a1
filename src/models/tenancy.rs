// src/models/tenancy.rs

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Organization (A rede)
// ---
// A conta principal, dona de várias filiais.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Branch (A filial)
// ---
// A unidade de isolamento: capsters, catálogo e fila pertencem à filial.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. Capster (O barbeiro)
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "capster_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CapsterStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Capster {
    pub id: Uuid,
    // Nulo = ainda não alocado a nenhuma filial
    pub branch_id: Option<Uuid>,
    // Nulo = o perfil existe antes de o humano ter conta
    pub account_id: Option<Uuid>,
    pub full_name: String,
    pub status: CapsterStatus,
    pub is_active: bool,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Capster {
    /// A regra única de "agendável": aprovado, ativo, disponível e alocado.
    pub fn is_bookable(&self) -> bool {
        self.status == CapsterStatus::Approved
            && self.is_active
            && self.is_available
            && self.branch_id.is_some()
    }
}

// ---
// 4. Service (O item do catálogo)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub organization_id: Uuid,
    // Nulo = oferecido em todas as filiais da organização
    pub branch_id: Option<Uuid>,
    pub name: String,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 5. Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationPayload {
    #[validate(length(min = 1, message = "O nome da organização é obrigatório."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchPayload {
    pub organization_id: Uuid,
    #[validate(length(min = 1, message = "O nome da filial é obrigatório."))]
    pub name: String,
    pub opens_at: Option<NaiveTime>,
    pub closes_at: Option<NaiveTime>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCapsterPayload {
    #[validate(length(min = 1, message = "O nome do capster é obrigatório."))]
    pub full_name: String,
    pub branch_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    // Lista específica de serviços; vazia ou ausente = atende todos.
    pub service_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateServicePayload {
    pub organization_id: Uuid,
    pub branch_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome do serviço é obrigatório."))]
    pub name: String,
    pub price: Decimal,
    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 minuto."))]
    pub duration_minutes: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignCapsterPayload {
    pub branch_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCapsterStatusPayload {
    pub status: CapsterStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCapsterAvailabilityPayload {
    pub is_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn capster(status: CapsterStatus, active: bool, available: bool, assigned: bool) -> Capster {
        Capster {
            id: Uuid::new_v4(),
            branch_id: assigned.then(Uuid::new_v4),
            account_id: None,
            full_name: "Capster de teste".into(),
            status,
            is_active: active,
            is_available: available,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn bookable_requires_all_four_conditions() {
        assert!(capster(CapsterStatus::Approved, true, true, true).is_bookable());

        assert!(!capster(CapsterStatus::Pending, true, true, true).is_bookable());
        assert!(!capster(CapsterStatus::Rejected, true, true, true).is_bookable());
        assert!(!capster(CapsterStatus::Approved, false, true, true).is_bookable());
        assert!(!capster(CapsterStatus::Approved, true, false, true).is_bookable());
        assert!(!capster(CapsterStatus::Approved, true, true, false).is_bookable());
    }
}
