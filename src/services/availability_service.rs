// src/services/availability_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenancyRepository,
    models::tenancy::{Capster, Service},
};

// Visão derivada de "quem atende o quê nesta filial, agora". Recalculada
// a cada consulta direto do registro de tenancy; não há cache que possa
// ficar defasado. Só leitura, nenhum efeito colateral.
#[derive(Clone)]
pub struct AvailabilityService {
    tenancy_repo: TenancyRepository,
    pool: PgPool,
}

impl AvailabilityService {
    pub fn new(tenancy_repo: TenancyRepository, pool: PgPool) -> Self {
        Self { tenancy_repo, pool }
    }

    /// Capsters agendáveis na filial, opcionalmente filtrados por serviço.
    pub async fn bookable_capsters(
        &self,
        branch_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<Vec<Capster>, AppError> {
        // Filial inexistente é 404, não uma lista vazia enganosa.
        self.tenancy_repo
            .find_branch(branch_id)
            .await?
            .ok_or(AppError::BranchNotFound)?;

        self.tenancy_repo
            .bookable_capsters(&self.pool, branch_id, service_id)
            .await
    }

    /// Serviços ativos visíveis na filial (os dela + os da organização).
    pub async fn active_services(&self, branch_id: Uuid) -> Result<Vec<Service>, AppError> {
        self.tenancy_repo
            .find_branch(branch_id)
            .await?
            .ok_or(AppError::BranchNotFound)?;

        self.tenancy_repo
            .active_services(&self.pool, branch_id)
            .await
    }
}
