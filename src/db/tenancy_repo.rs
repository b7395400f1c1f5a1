// src/db/tenancy_repo.rs

use chrono::NaiveTime;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tenancy::{Branch, Capster, CapsterStatus, Organization, Service},
};

const BRANCH_COLUMNS: &str =
    "id, organization_id, name, opens_at, closes_at, is_active, created_at, updated_at";
const CAPSTER_COLUMNS: &str =
    "id, branch_id, account_id, full_name, status, is_active, is_available, created_at, updated_at";
const SERVICE_COLUMNS: &str = "id, organization_id, branch_id, name, price, duration_minutes, \
                               is_active, created_at, updated_at";

// Dono exclusivo da hierarquia organização -> filial -> (capsters, serviços).
#[derive(Clone)]
pub struct TenancyRepository {
    pool: PgPool,
}

impl TenancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Organizações ---

    pub async fn create_organization<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name)
            VALUES ($1)
            RETURNING id, name, is_active, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(org)
    }

    pub async fn list_organizations(&self) -> Result<Vec<Organization>, AppError> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT id, name, is_active, created_at, updated_at FROM organizations ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orgs)
    }

    // --- Filiais ---

    pub async fn create_branch<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        name: &str,
        opens_at: Option<NaiveTime>,
        closes_at: Option<NaiveTime>,
    ) -> Result<Branch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let branch = sqlx::query_as::<_, Branch>(&format!(
            r#"
            INSERT INTO branches (organization_id, name, opens_at, closes_at)
            VALUES (
                $1, $2,
                COALESCE($3, '08:00'::time),
                COALESCE($4, '20:00'::time)
            )
            RETURNING {BRANCH_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(name)
        .bind(opens_at)
        .bind(closes_at)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::OrganizationNotFound;
                }
            }
            e.into()
        })?;

        Ok(branch)
    }

    pub async fn find_branch(&self, id: Uuid) -> Result<Option<Branch>, AppError> {
        let maybe_branch = sqlx::query_as::<_, Branch>(&format!(
            "SELECT {BRANCH_COLUMNS} FROM branches WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_branch)
    }

    pub async fn list_branches(
        &self,
        organization_id: Option<Uuid>,
    ) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(&format!(
            r#"
            SELECT {BRANCH_COLUMNS} FROM branches
            WHERE ($1::uuid IS NULL OR organization_id = $1)
            ORDER BY name
            "#
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }

    // --- Capsters ---

    pub async fn create_capster<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        branch_id: Option<Uuid>,
        account_id: Option<Uuid>,
    ) -> Result<Capster, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let capster = sqlx::query_as::<_, Capster>(&format!(
            r#"
            INSERT INTO capsters (full_name, branch_id, account_id)
            VALUES ($1, $2, $3)
            RETURNING {CAPSTER_COLUMNS}
            "#
        ))
        .bind(full_name)
        .bind(branch_id)
        .bind(account_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::BranchNotFound;
                }
            }
            e.into()
        })?;

        Ok(capster)
    }

    pub async fn find_capster(&self, id: Uuid) -> Result<Option<Capster>, AppError> {
        let maybe_capster = sqlx::query_as::<_, Capster>(&format!(
            "SELECT {CAPSTER_COLUMNS} FROM capsters WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_capster)
    }

    // Alocação/desalocação: um capster nunca é apagado, só muda de filial
    // ou fica com branch_id nulo.
    pub async fn update_capster_branch<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        branch_id: Option<Uuid>,
    ) -> Result<Capster, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let capster = sqlx::query_as::<_, Capster>(&format!(
            r#"
            UPDATE capsters
            SET branch_id = $2, updated_at = now()
            WHERE id = $1
            RETURNING {CAPSTER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(branch_id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::CapsterNotFound)?;

        Ok(capster)
    }

    pub async fn update_capster_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: CapsterStatus,
    ) -> Result<Capster, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let capster = sqlx::query_as::<_, Capster>(&format!(
            r#"
            UPDATE capsters
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {CAPSTER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::CapsterNotFound)?;

        Ok(capster)
    }

    pub async fn update_capster_availability<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        is_available: bool,
    ) -> Result<Capster, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let capster = sqlx::query_as::<_, Capster>(&format!(
            r#"
            UPDATE capsters
            SET is_available = $2, updated_at = now()
            WHERE id = $1
            RETURNING {CAPSTER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(is_available)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::CapsterNotFound)?;

        Ok(capster)
    }

    // Lista específica de serviços do capster. Sem linhas = atende todos.
    pub async fn set_capster_services<'e, E>(
        &self,
        executor: E,
        capster_id: Uuid,
        service_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Inserção em massa usando UNNEST para performance
        sqlx::query(
            r#"
            INSERT INTO capster_services (capster_id, service_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(capster_id)
        .bind(service_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    // --- Serviços ---

    pub async fn create_service<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        branch_id: Option<Uuid>,
        name: &str,
        price: Decimal,
        duration_minutes: i32,
    ) -> Result<Service, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, Service>(&format!(
            r#"
            INSERT INTO services (organization_id, branch_id, name, price, duration_minutes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SERVICE_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(branch_id)
        .bind(name)
        .bind(price)
        .bind(duration_minutes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::OrganizationNotFound;
                }
            }
            e.into()
        })?;

        Ok(service)
    }

    pub async fn find_service(&self, id: Uuid) -> Result<Option<Service>, AppError> {
        let maybe_service = sqlx::query_as::<_, Service>(&format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_service)
    }

    // --- Consultas de disponibilidade (visão derivada, recalculada sob demanda) ---

    /// Capsters agendáveis na filial: aprovados, ativos, disponíveis e
    /// alocados nela. Com `service_id`, filtra ainda pela lista específica
    /// de serviços do capster (um capster sem lista atende qualquer um).
    pub async fn bookable_capsters<'e, E>(
        &self,
        executor: E,
        branch_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<Vec<Capster>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let capsters = sqlx::query_as::<_, Capster>(&format!(
            r#"
            SELECT {CAPSTER_COLUMNS}
            FROM capsters c
            WHERE c.branch_id = $1
              AND c.status = 'approved'
              AND c.is_active = TRUE
              AND c.is_available = TRUE
              AND (
                  $2::uuid IS NULL
                  OR NOT EXISTS (
                      SELECT 1 FROM capster_services cs WHERE cs.capster_id = c.id
                  )
                  OR EXISTS (
                      SELECT 1 FROM capster_services cs
                      WHERE cs.capster_id = c.id AND cs.service_id = $2
                  )
              )
            ORDER BY c.full_name
            "#
        ))
        .bind(branch_id)
        .bind(service_id)
        .fetch_all(executor)
        .await?;

        Ok(capsters)
    }

    /// Serviços ativos visíveis na filial: os dela mais os de organização
    /// inteira (branch_id nulo), sempre dentro da mesma organização.
    pub async fn active_services<'e, E>(
        &self,
        executor: E,
        branch_id: Uuid,
    ) -> Result<Vec<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT s.id, s.organization_id, s.branch_id, s.name, s.price,
                   s.duration_minutes, s.is_active, s.created_at, s.updated_at
            FROM services s
            JOIN branches b ON b.id = $1
            WHERE s.organization_id = b.organization_id
              AND s.is_active = TRUE
              AND (s.branch_id IS NULL OR s.branch_id = $1)
            ORDER BY s.name
            "#,
        )
        .bind(branch_id)
        .fetch_all(executor)
        .await?;

        Ok(services)
    }
}
