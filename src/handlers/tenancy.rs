// src/handlers/tenancy.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::roles::{RequireAdmin, RequireStaff},
    models::tenancy::{
        AssignCapsterPayload, Branch, Capster, CreateBranchPayload, CreateCapsterPayload,
        CreateOrganizationPayload, CreateServicePayload, Organization, Service,
        UpdateCapsterAvailabilityPayload, UpdateCapsterStatusPayload,
    },
};

// =============================================================================
//  Organizações
// =============================================================================

// POST /api/organizations (admin)
#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = "Tenancy",
    request_body = CreateOrganizationPayload,
    responses(
        (status = 201, description = "Organização criada", body = Organization),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let org = app_state
        .tenancy_service
        .create_organization(&payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(org)))
}

// GET /api/organizations (admin)
#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Todas as organizações", body = Vec<Organization>),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_organizations(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<Json<Vec<Organization>>, AppError> {
    let orgs = app_state.tenancy_service.list_organizations().await?;
    Ok(Json(orgs))
}

// =============================================================================
//  Filiais
// =============================================================================

// POST /api/branches (admin)
#[utoipa::path(
    post,
    path = "/api/branches",
    tag = "Tenancy",
    request_body = CreateBranchPayload,
    responses(
        (status = 201, description = "Filial criada", body = Branch),
        (status = 403, description = "Requer papel admin"),
        (status = 404, description = "Organização não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_branch(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateBranchPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let branch = app_state
        .tenancy_service
        .create_branch(
            payload.organization_id,
            &payload.name,
            payload.opens_at,
            payload.closes_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(branch)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBranchesQuery {
    pub organization_id: Option<Uuid>,
}

// GET /api/branches (público: o cliente escolhe a filial antes de logar)
#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "Tenancy",
    params(ListBranchesQuery),
    responses(
        (status = 200, description = "Filiais, opcionalmente filtradas por organização", body = Vec<Branch>)
    )
)]
pub async fn list_branches(
    State(app_state): State<AppState>,
    Query(query): Query<ListBranchesQuery>,
) -> Result<Json<Vec<Branch>>, AppError> {
    let branches = app_state
        .tenancy_service
        .list_branches(query.organization_id)
        .await?;
    Ok(Json(branches))
}

// =============================================================================
//  Capsters
// =============================================================================

// POST /api/capsters (admin)
//
// O capster nasce 'pending': só fica agendável depois da aprovação.
#[utoipa::path(
    post,
    path = "/api/capsters",
    tag = "Tenancy",
    request_body = CreateCapsterPayload,
    responses(
        (status = 201, description = "Capster criado, aguardando aprovação", body = Capster),
        (status = 403, description = "Requer papel admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_capster(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateCapsterPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let capster = app_state
        .tenancy_service
        .create_capster(
            &payload.full_name,
            payload.branch_id,
            payload.account_id,
            payload.service_ids,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(capster)))
}

// GET /api/capsters/{id}
#[utoipa::path(
    get,
    path = "/api/capsters/{id}",
    tag = "Tenancy",
    params(("id" = Uuid, Path, description = "ID do capster")),
    responses(
        (status = 200, description = "Capster", body = Capster),
        (status = 404, description = "Capster não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_capster(
    State(app_state): State<AppState>,
    _staff: RequireStaff,
    Path(id): Path<Uuid>,
) -> Result<Json<Capster>, AppError> {
    let capster = app_state.tenancy_service.get_capster(id).await?;
    Ok(Json(capster))
}

// POST /api/capsters/{id}/assign (admin)
//
// Alocação respeita a organização: capster de uma rede nunca é movido
// para filial de outra.
#[utoipa::path(
    post,
    path = "/api/capsters/{id}/assign",
    tag = "Tenancy",
    params(("id" = Uuid, Path, description = "ID do capster")),
    request_body = AssignCapsterPayload,
    responses(
        (status = 200, description = "Capster alocado à filial", body = Capster),
        (status = 403, description = "Requer papel admin"),
        (status = 422, description = "Filial de outra organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_capster(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignCapsterPayload>,
) -> Result<Json<Capster>, AppError> {
    let capster = app_state
        .tenancy_service
        .assign_capster_to_branch(id, payload.branch_id)
        .await?;
    Ok(Json(capster))
}

// POST /api/capsters/{id}/unassign (admin)
#[utoipa::path(
    post,
    path = "/api/capsters/{id}/unassign",
    tag = "Tenancy",
    params(("id" = Uuid, Path, description = "ID do capster")),
    responses(
        (status = 200, description = "Capster desalocado (branch_id nulo)", body = Capster),
        (status = 403, description = "Requer papel admin"),
        (status = 404, description = "Capster não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn unassign_capster(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<Capster>, AppError> {
    let capster = app_state.tenancy_service.unassign_capster(id).await?;
    Ok(Json(capster))
}

// PATCH /api/capsters/{id}/status (admin)
//
// O portão de aprovação: decisão de admin, nunca automática.
#[utoipa::path(
    patch,
    path = "/api/capsters/{id}/status",
    tag = "Tenancy",
    params(("id" = Uuid, Path, description = "ID do capster")),
    request_body = UpdateCapsterStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Capster),
        (status = 403, description = "Requer papel admin"),
        (status = 404, description = "Capster não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_capster_status(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCapsterStatusPayload>,
) -> Result<Json<Capster>, AppError> {
    let capster = app_state
        .tenancy_service
        .set_capster_status(id, payload.status)
        .await?;
    Ok(Json(capster))
}

// PATCH /api/capsters/{id}/availability (staff ou admin)
//
// Staff só alterna o capster vinculado à própria conta; a checagem
// fica no serviço, que conhece o vínculo capster -> conta.
#[utoipa::path(
    patch,
    path = "/api/capsters/{id}/availability",
    tag = "Tenancy",
    params(("id" = Uuid, Path, description = "ID do capster")),
    request_body = UpdateCapsterAvailabilityPayload,
    responses(
        (status = 200, description = "Disponibilidade atualizada", body = Capster),
        (status = 403, description = "Capster de outra conta"),
        (status = 404, description = "Capster não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_capster_availability(
    State(app_state): State<AppState>,
    RequireStaff(profile): RequireStaff,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCapsterAvailabilityPayload>,
) -> Result<Json<Capster>, AppError> {
    let capster = app_state
        .tenancy_service
        .set_capster_availability(id, payload.is_available, &profile)
        .await?;
    Ok(Json(capster))
}

// =============================================================================
//  Serviços (catálogo)
// =============================================================================

// POST /api/services (admin)
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Tenancy",
    request_body = CreateServicePayload,
    responses(
        (status = 201, description = "Serviço criado no catálogo", body = Service),
        (status = 403, description = "Requer papel admin"),
        (status = 422, description = "Filial de outra organização")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    _admin: RequireAdmin,
    Json(payload): Json<CreateServicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let service = app_state
        .tenancy_service
        .create_service(
            payload.organization_id,
            payload.branch_id,
            &payload.name,
            payload.price,
            payload.duration_minutes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(service)))
}
