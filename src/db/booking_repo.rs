// src/db/booking_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::booking::{Booking, BookingDetail, BookingStatus},
};

const BOOKING_COLUMNS: &str = "id, customer_id, branch_id, service_id, capster_id, booking_date, \
                               booking_time, queue_number, status, created_at, updated_at";

// Dono exclusivo da identidade dos agendamentos e da atribuição de senha.
#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Próxima senha da fila para (filial, dia).
    ///
    /// O upsert na linha-contador serializa pelo lock de linha do Postgres:
    /// a segunda transação concorrente espera o commit da primeira e lê o
    /// valor já incrementado. Nada de "ler o MAX e somar 1" em dois passos.
    /// Deve rodar dentro da MESMA transação que insere o agendamento.
    pub async fn next_queue_number<'e, E>(
        &self,
        executor: E,
        branch_id: Uuid,
        date: NaiveDate,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let number = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO branch_queue_counters (branch_id, queue_date, last_number)
            VALUES ($1, $2, 1)
            ON CONFLICT (branch_id, queue_date)
            DO UPDATE SET last_number = branch_queue_counters.last_number + 1
            RETURNING last_number
            "#,
        )
        .bind(branch_id)
        .bind(date)
        .fetch_one(executor)
        .await?;

        Ok(number)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_booking<'e, E>(
        &self,
        executor: E,
        customer_id: Uuid,
        branch_id: Uuid,
        service_id: Uuid,
        capster_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        queue_number: i32,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings (
                customer_id, branch_id, service_id, capster_id,
                booking_date, booking_time, queue_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(branch_id)
        .bind(service_id)
        .bind(capster_id)
        .bind(date)
        .bind(time)
        .bind(queue_number)
        .fetch_one(executor)
        .await?;

        Ok(booking)
    }

    pub async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let maybe_booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe_booking)
    }

    /// Busca com lock de linha (FOR UPDATE), para transições: segura o
    /// agendamento até o commit e impede duas transições simultâneas.
    pub async fn find_booking_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Booking>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(maybe_booking)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::BookingNotFound)?;

        Ok(booking)
    }

    // --- Visões denormalizadas para exibição ---

    pub async fn detail<'e, E>(&self, executor: E, id: Uuid) -> Result<BookingDetail, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let detail = sqlx::query_as::<_, BookingDetail>(
            r#"
            SELECT bk.id, bk.customer_id, bk.branch_id, bk.service_id, bk.capster_id,
                   bk.booking_date, bk.booking_time, bk.queue_number, bk.status,
                   bk.created_at, bk.updated_at,
                   b.name AS branch_name,
                   s.name AS service_name,
                   c.full_name AS capster_name
            FROM bookings bk
            JOIN branches b ON b.id = bk.branch_id
            JOIN services s ON s.id = bk.service_id
            JOIN capsters c ON c.id = bk.capster_id
            WHERE bk.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::BookingNotFound)?;

        Ok(detail)
    }

    // A fila do dia, na ordem das senhas.
    pub async fn list_for_branch_date(
        &self,
        branch_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookingDetail>, AppError> {
        let bookings = sqlx::query_as::<_, BookingDetail>(
            r#"
            SELECT bk.id, bk.customer_id, bk.branch_id, bk.service_id, bk.capster_id,
                   bk.booking_date, bk.booking_time, bk.queue_number, bk.status,
                   bk.created_at, bk.updated_at,
                   b.name AS branch_name,
                   s.name AS service_name,
                   c.full_name AS capster_name
            FROM bookings bk
            JOIN branches b ON b.id = bk.branch_id
            JOIN services s ON s.id = bk.service_id
            JOIN capsters c ON c.id = bk.capster_id
            WHERE bk.branch_id = $1 AND bk.booking_date = $2
            ORDER BY bk.queue_number
            "#,
        )
        .bind(branch_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<BookingDetail>, AppError> {
        let bookings = sqlx::query_as::<_, BookingDetail>(
            r#"
            SELECT bk.id, bk.customer_id, bk.branch_id, bk.service_id, bk.capster_id,
                   bk.booking_date, bk.booking_time, bk.queue_number, bk.status,
                   bk.created_at, bk.updated_at,
                   b.name AS branch_name,
                   s.name AS service_name,
                   c.full_name AS capster_name
            FROM bookings bk
            JOIN branches b ON b.id = bk.branch_id
            JOIN services s ON s.id = bk.service_id
            JOIN capsters c ON c.id = bk.capster_id
            WHERE bk.customer_id = $1
            ORDER BY bk.booking_date DESC, bk.queue_number DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }
}
