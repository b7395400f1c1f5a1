// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::update_me,

        // --- Access Keys ---
        handlers::access_keys::validate_key,
        handlers::access_keys::consume_key,
        handlers::access_keys::create_key,
        handlers::access_keys::list_keys,
        handlers::access_keys::deactivate_key,

        // --- Tenancy ---
        handlers::tenancy::create_organization,
        handlers::tenancy::list_organizations,
        handlers::tenancy::create_branch,
        handlers::tenancy::list_branches,
        handlers::tenancy::create_capster,
        handlers::tenancy::get_capster,
        handlers::tenancy::assign_capster,
        handlers::tenancy::unassign_capster,
        handlers::tenancy::update_capster_status,
        handlers::tenancy::update_capster_availability,
        handlers::tenancy::create_service,

        // --- Availability ---
        handlers::availability::bookable_capsters,
        handlers::availability::active_services,

        // --- Bookings ---
        handlers::bookings::create_booking,
        handlers::bookings::my_bookings,
        handlers::bookings::list_bookings,
        handlers::bookings::get_booking,
        handlers::bookings::transition_booking,
        handlers::bookings::cancel_booking,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,

            // --- Profiles ---
            models::profile::UserRole,
            models::profile::Profile,
            models::profile::UpdateProfilePayload,

            // --- Access Keys ---
            models::access_key::AccessKey,
            models::access_key::InvalidKeyReason,
            models::access_key::ValidateKeyPayload,
            models::access_key::ConsumeKeyPayload,
            models::access_key::CreateKeyPayload,
            models::access_key::ValidateKeyResponse,
            models::access_key::ConsumeKeyResponse,

            // --- Tenancy ---
            models::tenancy::Organization,
            models::tenancy::Branch,
            models::tenancy::CapsterStatus,
            models::tenancy::Capster,
            models::tenancy::Service,
            models::tenancy::CreateOrganizationPayload,
            models::tenancy::CreateBranchPayload,
            models::tenancy::CreateCapsterPayload,
            models::tenancy::CreateServicePayload,
            models::tenancy::AssignCapsterPayload,
            models::tenancy::UpdateCapsterStatusPayload,
            models::tenancy::UpdateCapsterAvailabilityPayload,

            // --- Bookings ---
            models::booking::BookingStatus,
            models::booking::Booking,
            models::booking::BookingDetail,
            models::booking::CreateBookingPayload,
            models::booking::TransitionBookingPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e registro via chave de acesso"),
        (name = "Users", description = "Conta e perfil da requisição atual"),
        (name = "Access Keys", description = "Chaves de acesso: validação, consumo e provisionamento"),
        (name = "Tenancy", description = "Organizações, filiais, capsters e catálogo"),
        (name = "Availability", description = "Quem atende o quê em cada filial, agora"),
        (name = "Bookings", description = "Admissão na fila e ciclo de vida do agendamento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
