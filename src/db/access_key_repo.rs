// src/db/access_key_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{access_key::AccessKey, profile::UserRole},
};

const KEY_COLUMNS: &str =
    "id, key_value, name, role, max_uses, current_uses, is_active, created_at, updated_at";

// O repositório das chaves de acesso. É o único lugar do sistema que
// escreve em `current_uses`.
#[derive(Clone)]
pub struct AccessKeyRepository {
    pool: PgPool,
}

impl AccessKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca pura, usada pelo `validate` (nunca mexe em contadores).
    pub async fn find_by_value(&self, key_value: &str) -> Result<Option<AccessKey>, AppError> {
        let maybe_key = sqlx::query_as::<_, AccessKey>(&format!(
            "SELECT {KEY_COLUMNS} FROM access_keys WHERE key_value = $1"
        ))
        .bind(key_value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_key)
    }

    /// Consome exatamente um uso da chave, de forma atômica.
    ///
    /// As condições (ativa, usos restantes e, quando informado, o papel)
    /// são re-checadas pelo próprio UPDATE condicional no momento do commit.
    /// Dois registros concorrentes contra uma chave com max_uses=1 nunca
    /// passam os dois: o segundo UPDATE afeta zero linhas.
    ///
    /// Retorna `Some(novo_contador)` se consumiu, `None` se foi recusado.
    pub async fn consume<'e, E>(
        &self,
        executor: E,
        key_value: &str,
        expected_role: Option<UserRole>,
    ) -> Result<Option<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let new_count = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE access_keys
            SET current_uses = current_uses + 1,
                updated_at = now()
            WHERE key_value = $1
              AND is_active = TRUE
              AND (max_uses IS NULL OR current_uses < max_uses)
              AND ($2::user_role IS NULL OR role = $2)
            RETURNING current_uses
            "#,
        )
        .bind(key_value)
        .bind(expected_role)
        .fetch_optional(executor)
        .await?;

        Ok(new_count)
    }

    // --- Provisionamento (rotas de admin) ---

    pub async fn create_key<'e, E>(
        &self,
        executor: E,
        key_value: &str,
        name: &str,
        role: UserRole,
        max_uses: Option<i32>,
    ) -> Result<AccessKey, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let key = sqlx::query_as::<_, AccessKey>(&format!(
            r#"
            INSERT INTO access_keys (key_value, name, role, max_uses)
            VALUES ($1, $2, $3, $4)
            RETURNING {KEY_COLUMNS}
            "#
        ))
        .bind(key_value)
        .bind(name)
        .bind(role)
        .bind(max_uses)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe uma chave com esse valor.".into(),
                    );
                }
            }
            e.into()
        })?;

        Ok(key)
    }

    // Chaves nunca são apagadas, apenas desativadas.
    pub async fn deactivate<'e, E>(&self, executor: E, id: Uuid) -> Result<AccessKey, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let key = sqlx::query_as::<_, AccessKey>(&format!(
            r#"
            UPDATE access_keys
            SET is_active = FALSE, updated_at = now()
            WHERE id = $1
            RETURNING {KEY_COLUMNS}
            "#
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::AccessKeyNotFound)?;

        Ok(key)
    }

    pub async fn list_keys(&self) -> Result<Vec<AccessKey>, AppError> {
        let keys = sqlx::query_as::<_, AccessKey>(&format!(
            "SELECT {KEY_COLUMNS} FROM access_keys ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }
}
