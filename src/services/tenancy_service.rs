// src/services/tenancy_service.rs

use chrono::NaiveTime;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenancyRepository,
    models::{
        profile::{Profile, UserRole},
        tenancy::{Branch, Capster, CapsterStatus, Organization, Service},
    },
};

#[derive(Clone)]
pub struct TenancyService {
    tenancy_repo: TenancyRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl TenancyService {
    pub fn new(tenancy_repo: TenancyRepository, pool: PgPool) -> Self {
        Self { tenancy_repo, pool }
    }

    // --- Organizações ---

    pub async fn create_organization(&self, name: &str) -> Result<Organization, AppError> {
        self.tenancy_repo
            .create_organization(&self.pool, name)
            .await
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, AppError> {
        self.tenancy_repo.list_organizations().await
    }

    // --- Filiais ---

    pub async fn create_branch(
        &self,
        organization_id: Uuid,
        name: &str,
        opens_at: Option<NaiveTime>,
        closes_at: Option<NaiveTime>,
    ) -> Result<Branch, AppError> {
        self.tenancy_repo
            .create_branch(&self.pool, organization_id, name, opens_at, closes_at)
            .await
    }

    pub async fn get_branch(&self, id: Uuid) -> Result<Branch, AppError> {
        self.tenancy_repo
            .find_branch(id)
            .await?
            .ok_or(AppError::BranchNotFound)
    }

    pub async fn list_branches(
        &self,
        organization_id: Option<Uuid>,
    ) -> Result<Vec<Branch>, AppError> {
        self.tenancy_repo.list_branches(organization_id).await
    }

    // --- Capsters ---

    /// Cria o capster já com a lista específica de serviços (quando houver),
    /// tudo na mesma transação. Nasce 'pending': só fica agendável depois
    /// da aprovação de um admin.
    pub async fn create_capster(
        &self,
        full_name: &str,
        branch_id: Option<Uuid>,
        account_id: Option<Uuid>,
        service_ids: Option<Vec<Uuid>>,
    ) -> Result<Capster, AppError> {
        let mut tx = self.pool.begin().await?;

        let capster = self
            .tenancy_repo
            .create_capster(&mut *tx, full_name, branch_id, account_id)
            .await?;

        if let Some(service_ids) = service_ids {
            if !service_ids.is_empty() {
                self.tenancy_repo
                    .set_capster_services(&mut *tx, capster.id, &service_ids)
                    .await?;
            }
        }

        tx.commit().await?;

        Ok(capster)
    }

    pub async fn get_capster(&self, id: Uuid) -> Result<Capster, AppError> {
        self.tenancy_repo
            .find_capster(id)
            .await?
            .ok_or(AppError::CapsterNotFound)
    }

    /// Aloca um capster a uma filial. A organização do capster (derivada
    /// da filial atual, quando alocado) precisa ser a mesma da filial de
    /// destino; a violação é rejeitada inteira, nunca "corrigida".
    pub async fn assign_capster_to_branch(
        &self,
        capster_id: Uuid,
        branch_id: Uuid,
    ) -> Result<Capster, AppError> {
        let capster = self.get_capster(capster_id).await?;

        let target = self
            .tenancy_repo
            .find_branch(branch_id)
            .await?
            .ok_or(AppError::BranchNotFound)?;

        if !target.is_active {
            return Err(AppError::InactiveBranch);
        }

        if let Some(current_branch_id) = capster.branch_id {
            let current = self
                .tenancy_repo
                .find_branch(current_branch_id)
                .await?
                .ok_or(AppError::BranchNotFound)?;

            if current.organization_id != target.organization_id {
                return Err(AppError::CrossOrganizationAssignment);
            }
        }

        self.tenancy_repo
            .update_capster_branch(&self.pool, capster_id, Some(branch_id))
            .await
    }

    /// Desaloca: branch_id vira nulo. Capster nunca é apagado.
    pub async fn unassign_capster(&self, capster_id: Uuid) -> Result<Capster, AppError> {
        self.tenancy_repo
            .update_capster_branch(&self.pool, capster_id, None)
            .await
    }

    // O portão de aprovação: decisão de admin, nunca automática.
    pub async fn set_capster_status(
        &self,
        capster_id: Uuid,
        status: CapsterStatus,
    ) -> Result<Capster, AppError> {
        self.tenancy_repo
            .update_capster_status(&self.pool, capster_id, status)
            .await
    }

    /// Liga/desliga a disponibilidade. Staff só mexe no capster vinculado
    /// à própria conta; admin mexe em qualquer um.
    pub async fn set_capster_availability(
        &self,
        capster_id: Uuid,
        is_available: bool,
        actor: &Profile,
    ) -> Result<Capster, AppError> {
        if actor.role != UserRole::Admin {
            let capster = self.get_capster(capster_id).await?;
            if capster.account_id != Some(actor.account_id) {
                return Err(AppError::Forbidden(
                    "Você só pode alterar a disponibilidade do seu próprio cadastro.".into(),
                ));
            }
        }

        self.tenancy_repo
            .update_capster_availability(&self.pool, capster_id, is_available)
            .await
    }

    // --- Serviços ---

    pub async fn create_service(
        &self,
        organization_id: Uuid,
        branch_id: Option<Uuid>,
        name: &str,
        price: Decimal,
        duration_minutes: i32,
    ) -> Result<Service, AppError> {
        // Serviço escopado a uma filial precisa ficar dentro da mesma
        // organização; serviço de organização inteira (branch_id nulo) não.
        if let Some(branch_id) = branch_id {
            let branch = self
                .tenancy_repo
                .find_branch(branch_id)
                .await?
                .ok_or(AppError::BranchNotFound)?;

            if branch.organization_id != organization_id {
                return Err(AppError::CrossOrganizationAssignment);
            }
        }

        self.tenancy_repo
            .create_service(
                &self.pool,
                organization_id,
                branch_id,
                name,
                price,
                duration_minutes,
            )
            .await
    }
}
