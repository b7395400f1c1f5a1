// src/services/profile_service.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProfileRepository, TenancyRepository},
    models::profile::{Profile, UserRole},
};

// Dono do campo `role` do perfil (escrito uma única vez, na criação).
// O chamador é responsável por sequenciar o consumo da chave de acesso
// ANTES de criar o perfil; este serviço não enxerga o estado das chaves.
#[derive(Clone)]
pub struct ProfileService {
    profile_repo: ProfileRepository,
    tenancy_repo: TenancyRepository,
    pool: PgPool,
}

impl ProfileService {
    pub fn new(
        profile_repo: ProfileRepository,
        tenancy_repo: TenancyRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            profile_repo,
            tenancy_repo,
            pool,
        }
    }

    /// Cria o único perfil da conta. Aceita um executor para participar
    /// da transação de registro do chamador.
    ///
    /// Afinidade de filial é opcional (staff pode ficar "pendente de
    /// alocação"), mas quando presente precisa apontar para filial ativa.
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        account_id: Uuid,
        role: UserRole,
        branch_id: Option<Uuid>,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if let Some(branch_id) = branch_id {
            // Leitura fora da transação do chamador; não participa da
            // parte crítica, que é a unicidade do perfil no INSERT.
            let branch = self
                .tenancy_repo
                .find_branch(branch_id)
                .await?
                .ok_or(AppError::BranchNotFound)?;

            if !branch.is_active {
                return Err(AppError::InactiveBranch);
            }
        }

        self.profile_repo
            .create_profile(executor, account_id, role, branch_id, full_name, phone)
            .await
    }

    pub async fn get_profile(&self, account_id: Uuid) -> Result<Profile, AppError> {
        self.profile_repo
            .find_by_account(account_id)
            .await?
            .ok_or(AppError::ProfileNotFound)
    }

    // Só nome e telefone; o papel nunca muda por aqui.
    pub async fn update_contact(
        &self,
        account_id: Uuid,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<Profile, AppError> {
        self.profile_repo
            .update_contact(&self.pool, account_id, full_name, phone)
            .await
    }
}
