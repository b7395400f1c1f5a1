// src/handlers/availability.rs

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::tenancy::{Capster, Service},
};

// A visão pública de disponibilidade: é exatamente a mesma consulta que
// o motor de agendamento usa na admissão, então o que o cliente enxerga
// aqui é o que vai passar na checagem de consistência.

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookableCapstersQuery {
    pub service_id: Option<Uuid>,
}

// GET /api/branches/{id}/capsters
#[utoipa::path(
    get,
    path = "/api/branches/{id}/capsters",
    tag = "Availability",
    params(
        ("id" = Uuid, Path, description = "ID da filial"),
        BookableCapstersQuery
    ),
    responses(
        (status = 200, description = "Capsters agendáveis agora nesta filial", body = Vec<Capster>),
        (status = 404, description = "Filial não encontrada")
    )
)]
pub async fn bookable_capsters(
    State(app_state): State<AppState>,
    Path(branch_id): Path<Uuid>,
    Query(query): Query<BookableCapstersQuery>,
) -> Result<Json<Vec<Capster>>, AppError> {
    let capsters = app_state
        .availability_service
        .bookable_capsters(branch_id, query.service_id)
        .await?;
    Ok(Json(capsters))
}

// GET /api/branches/{id}/services
#[utoipa::path(
    get,
    path = "/api/branches/{id}/services",
    tag = "Availability",
    params(("id" = Uuid, Path, description = "ID da filial")),
    responses(
        (status = 200, description = "Serviços ativos visíveis nesta filial", body = Vec<Service>),
        (status = 404, description = "Filial não encontrada")
    )
)]
pub async fn active_services(
    State(app_state): State<AppState>,
    Path(branch_id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, AppError> {
    let services = app_state
        .availability_service
        .active_services(branch_id)
        .await?;
    Ok(Json(services))
}
