// src/handlers/bookings.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, roles::RequireStaff},
    models::{
        booking::{BookingDetail, CreateBookingPayload, ListBookingsQuery, TransitionBookingPayload},
        profile::UserRole,
    },
};

// POST /api/bookings
//
// A admissão: consistência filial/serviço/capster + senha da fila +
// INSERT, tudo numa transação só dentro do BookingService.
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "Bookings",
    request_body = CreateBookingPayload,
    responses(
        (status = 201, description = "Agendamento admitido, com a senha da fila", body = BookingDetail),
        (status = 404, description = "Filial não encontrada"),
        (status = 422, description = "Serviço ou capster não disponível nesta filial")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_booking(
    State(app_state): State<AppState>,
    actor: AuthenticatedUser,
    Json(payload): Json<CreateBookingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .booking_service
        .create_booking(actor.account.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/bookings/mine
#[utoipa::path(
    get,
    path = "/api/bookings/mine",
    tag = "Bookings",
    responses(
        (status = 200, description = "Agendamentos da conta atual, mais recentes primeiro", body = Vec<BookingDetail>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_bookings(
    State(app_state): State<AppState>,
    actor: AuthenticatedUser,
) -> Result<Json<Vec<BookingDetail>>, AppError> {
    let bookings = app_state
        .booking_service
        .my_bookings(actor.account.id)
        .await?;
    Ok(Json(bookings))
}

// GET /api/bookings?branchId=&date= (staff ou admin)
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "Bookings",
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "A fila do dia na filial, na ordem das senhas", body = Vec<BookingDetail>),
        (status = 403, description = "Requer papel de staff ou admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_bookings(
    State(app_state): State<AppState>,
    _staff: RequireStaff,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<Vec<BookingDetail>>, AppError> {
    let bookings = app_state
        .booking_service
        .branch_queue(query.branch_id, query.date)
        .await?;
    Ok(Json(bookings))
}

// GET /api/bookings/{id}
//
// Cliente só enxerga o próprio agendamento; staff/admin enxergam todos.
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento", body = BookingDetail),
        (status = 403, description = "Agendamento de outra conta"),
        (status = 404, description = "Agendamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_booking(
    State(app_state): State<AppState>,
    actor: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetail>, AppError> {
    let detail = app_state.booking_service.get_booking(id).await?;

    if actor.profile.role == UserRole::Customer && detail.booking.customer_id != actor.account.id {
        return Err(AppError::Forbidden(
            "Você só pode consultar os seus próprios agendamentos.".into(),
        ));
    }

    Ok(Json(detail))
}

// POST /api/bookings/{id}/transition (staff ou admin)
#[utoipa::path(
    post,
    path = "/api/bookings/{id}/transition",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    request_body = TransitionBookingPayload,
    responses(
        (status = 200, description = "Agendamento movido no ciclo de vida", body = BookingDetail),
        (status = 403, description = "Requer papel de staff ou admin"),
        (status = 404, description = "Agendamento não encontrado"),
        (status = 409, description = "Transição ilegal; o corpo traz o estado atual")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_booking(
    State(app_state): State<AppState>,
    _staff: RequireStaff,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionBookingPayload>,
) -> Result<Json<BookingDetail>, AppError> {
    let detail = app_state
        .booking_service
        .transition(id, payload.target_status)
        .await?;
    Ok(Json(detail))
}

// POST /api/bookings/{id}/cancel
//
// Cliente cancela o próprio agendamento; staff/admin cancelam qualquer
// um. A regra de posse fica no serviço.
#[utoipa::path(
    post,
    path = "/api/bookings/{id}/cancel",
    tag = "Bookings",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 200, description = "Agendamento cancelado; a senha não é reaproveitada", body = BookingDetail),
        (status = 403, description = "Agendamento de outra conta"),
        (status = 404, description = "Agendamento não encontrado"),
        (status = 409, description = "Estado atual não permite cancelamento")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_booking(
    State(app_state): State<AppState>,
    actor: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetail>, AppError> {
    let detail = app_state
        .booking_service
        .cancel(id, &actor.profile)
        .await?;
    Ok(Json(detail))
}
