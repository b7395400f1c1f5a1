// src/handlers.rs

pub mod access_keys;
pub mod auth;
pub mod availability;
pub mod bookings;
pub mod tenancy;

use axum::{
    Json, Router,
    routing::{get, patch, post},
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc};

/// Monta o router da API inteira. A proteção das rotas fica nos
/// extratores dos handlers (AuthenticatedUser / RequireAdmin /
/// RequireStaff), não em camadas de estado global.
pub fn api_router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new().route("/me", get(auth::get_me).patch(auth::update_me));

    let access_key_routes = Router::new()
        .route(
            "/",
            post(access_keys::create_key).get(access_keys::list_keys),
        )
        .route("/validate", post(access_keys::validate_key))
        .route("/consume", post(access_keys::consume_key))
        .route("/{id}/deactivate", post(access_keys::deactivate_key));

    let organization_routes = Router::new().route(
        "/",
        post(tenancy::create_organization).get(tenancy::list_organizations),
    );

    let branch_routes = Router::new()
        .route("/", post(tenancy::create_branch).get(tenancy::list_branches))
        .route("/{id}/capsters", get(availability::bookable_capsters))
        .route("/{id}/services", get(availability::active_services));

    let capster_routes = Router::new()
        .route("/", post(tenancy::create_capster))
        .route("/{id}", get(tenancy::get_capster))
        .route("/{id}/assign", post(tenancy::assign_capster))
        .route("/{id}/unassign", post(tenancy::unassign_capster))
        .route("/{id}/status", patch(tenancy::update_capster_status))
        .route(
            "/{id}/availability",
            patch(tenancy::update_capster_availability),
        );

    let service_routes = Router::new().route("/", post(tenancy::create_service));

    let booking_routes = Router::new()
        .route(
            "/",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route("/mine", get(bookings::my_bookings))
        .route("/{id}", get(bookings::get_booking))
        .route("/{id}/transition", post(bookings::transition_booking))
        .route("/{id}/cancel", post(bookings::cancel_booking));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(openapi_json))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/access-keys", access_key_routes)
        .nest("/api/organizations", organization_routes)
        .nest("/api/branches", branch_routes)
        .nest("/api/capsters", capster_routes)
        .nest("/api/services", service_routes)
        .nest("/api/bookings", booking_routes)
        .with_state(app_state)
}

// O documento OpenAPI servido como JSON puro.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
