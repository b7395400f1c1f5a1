// src/services/booking_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{BookingRepository, TenancyRepository},
    models::{
        booking::{BookingDetail, BookingStatus, CreateBookingPayload},
        profile::{Profile, UserRole},
        tenancy::CapsterStatus,
    },
};

// O motor de admissão: valida a consistência entre filial, serviço e
// capster, tira a senha da fila e conduz o agendamento pelo ciclo de vida.
#[derive(Clone)]
pub struct BookingService {
    booking_repo: BookingRepository,
    tenancy_repo: TenancyRepository,
    pool: PgPool,
}

impl BookingService {
    pub fn new(
        booking_repo: BookingRepository,
        tenancy_repo: TenancyRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            booking_repo,
            tenancy_repo,
            pool,
        }
    }

    /// A admissão inteira é UMA transação: checagem de consistência,
    /// senha e INSERT. Se qualquer passo falhar, nada fica escrito, e o
    /// retry do chamador é idempotente.
    pub async fn create_booking(
        &self,
        customer_id: Uuid,
        payload: CreateBookingPayload,
    ) -> Result<BookingDetail, AppError> {
        let branch = self
            .tenancy_repo
            .find_branch(payload.branch_id)
            .await?
            .ok_or(AppError::BranchNotFound)?;

        if !branch.is_active {
            return Err(AppError::InactiveBranch);
        }

        let mut tx = self.pool.begin().await?;

        // 1. Consistência, via a mesma visão de disponibilidade que o
        // cliente enxerga, escopada à filial. Serviço ou capster de outra
        // filial/organização morre aqui, antes de qualquer escrita.
        let services = self
            .tenancy_repo
            .active_services(&mut *tx, payload.branch_id)
            .await?;
        if !services.iter().any(|s| s.id == payload.service_id) {
            return Err(AppError::ServiceNotOfferedAtBranch);
        }

        let capsters = self
            .tenancy_repo
            .bookable_capsters(&mut *tx, payload.branch_id, Some(payload.service_id))
            .await?;
        if !capsters.iter().any(|c| c.id == payload.capster_id) {
            return Err(AppError::StaffNotBookableAtBranch);
        }

        // 2. Senha por (filial, dia). O upsert no contador serializa
        // pedidos concorrentes; nunca saem duas senhas iguais.
        let queue_number = self
            .booking_repo
            .next_queue_number(&mut *tx, payload.branch_id, payload.booking_date)
            .await?;

        // 3. Insere já com a senha, no estado inicial 'pending'.
        let booking = self
            .booking_repo
            .insert_booking(
                &mut *tx,
                customer_id,
                payload.branch_id,
                payload.service_id,
                payload.capster_id,
                payload.booking_date,
                payload.booking_time,
                queue_number,
            )
            .await?;

        // 4. Resolve os nomes para exibição ainda dentro da transação.
        let detail = self.booking_repo.detail(&mut *tx, booking.id).await?;

        tx.commit().await?;

        tracing::info!(
            booking_id = %detail.booking.id,
            queue_number,
            "Agendamento admitido na fila"
        );

        Ok(detail)
    }

    /// Move o agendamento por uma aresta legal do ciclo de vida. Aresta
    /// ilegal devolve o estado atual e não escreve nada.
    pub async fn transition(
        &self,
        booking_id: Uuid,
        target: BookingStatus,
    ) -> Result<BookingDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE: duas transições simultâneas do mesmo agendamento
        // são serializadas, a segunda enxerga o estado já movido.
        let booking = self
            .booking_repo
            .find_booking_for_update(&mut *tx, booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if !booking.status.can_transition_to(target) {
            return Err(AppError::IllegalTransition {
                from: booking.status,
                to: target,
            });
        }

        // Confirmar re-valida o capster: se ele foi desativado (ou perdeu
        // a aprovação) entre a criação e a confirmação, bloqueia em vez de
        // confirmar em silêncio.
        if target == BookingStatus::Confirmed {
            let capster = self
                .tenancy_repo
                .find_capster(booking.capster_id)
                .await?
                .ok_or(AppError::CapsterNotFound)?;

            if !capster.is_active || capster.status != CapsterStatus::Approved {
                return Err(AppError::StaffNotBookableAtBranch);
            }
        }

        self.booking_repo
            .update_status(&mut *tx, booking_id, target)
            .await?;
        let detail = self.booking_repo.detail(&mut *tx, booking_id).await?;

        tx.commit().await?;

        Ok(detail)
    }

    /// Cancelamento: permitido em 'pending' e 'confirmed'. Cliente só
    /// cancela o próprio agendamento; staff/admin cancelam qualquer um.
    /// A senha liberada não é reaproveitada (buracos na fila são normais).
    pub async fn cancel(&self, booking_id: Uuid, actor: &Profile) -> Result<BookingDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let booking = self
            .booking_repo
            .find_booking_for_update(&mut *tx, booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if actor.role == UserRole::Customer && booking.customer_id != actor.account_id {
            return Err(AppError::Forbidden(
                "Você só pode cancelar os seus próprios agendamentos.".into(),
            ));
        }

        if !booking.status.is_cancellable() {
            return Err(AppError::IllegalTransition {
                from: booking.status,
                to: BookingStatus::Cancelled,
            });
        }

        self.booking_repo
            .update_status(&mut *tx, booking_id, BookingStatus::Cancelled)
            .await?;
        let detail = self.booking_repo.detail(&mut *tx, booking_id).await?;

        tx.commit().await?;

        Ok(detail)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<BookingDetail, AppError> {
        self.booking_repo.detail(&self.pool, booking_id).await
    }

    // A fila do dia, na ordem das senhas.
    pub async fn branch_queue(
        &self,
        branch_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BookingDetail>, AppError> {
        self.booking_repo
            .list_for_branch_date(branch_id, date)
            .await
    }

    pub async fn my_bookings(&self, customer_id: Uuid) -> Result<Vec<BookingDetail>, AppError> {
        self.booking_repo.list_for_customer(customer_id).await
    }
}
