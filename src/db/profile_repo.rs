// src/db/profile_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::profile::{Profile, UserRole},
};

const PROFILE_COLUMNS: &str =
    "id, account_id, role, branch_id, full_name, phone, created_at, updated_at";

// Um perfil por conta. A unicidade vem da constraint do banco
// (profiles_account_id_key), nunca de um check-then-insert aqui.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria o perfil da conta. O `role` é gravado aqui uma única vez;
    /// nenhum outro método deste repositório o toca.
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
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (account_id, role, branch_id, full_name, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(account_id)
        .bind(role)
        .bind(branch_id)
        .bind(full_name)
        .bind(phone)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    // Segunda tentativa de registro para a mesma conta
                    return AppError::DuplicateProfile;
                }
            }
            e.into()
        })?;

        Ok(profile)
    }

    pub async fn find_by_account(&self, account_id: Uuid) -> Result<Option<Profile>, AppError> {
        let maybe_profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE account_id = $1"
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_profile)
    }

    // Atualização pós-registro: só nome e telefone. O papel é imutável.
    pub async fn update_contact<'e, E>(
        &self,
        executor: E,
        account_id: Uuid,
        full_name: &str,
        phone: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET full_name = $2, phone = $3, updated_at = now()
            WHERE account_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(account_id)
        .bind(full_name)
        .bind(phone)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ProfileNotFound)?;

        Ok(profile)
    }
}
