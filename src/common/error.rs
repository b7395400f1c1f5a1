use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::{access_key::InvalidKeyReason, booking::BookingStatus};

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Falhas de regra de negócio são variantes tipadas e viram 4xx com um
// `kind` legível por máquina; só falhas de infraestrutura viram 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Perfil não encontrado")]
    ProfileNotFound,

    #[error("Organização não encontrada")]
    OrganizationNotFound,

    #[error("Filial não encontrada")]
    BranchNotFound,

    #[error("Capster não encontrado")]
    CapsterNotFound,

    #[error("Serviço não encontrado")]
    ServiceNotFound,

    #[error("Agendamento não encontrado")]
    BookingNotFound,

    #[error("Chave de acesso não encontrada")]
    AccessKeyNotFound,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Recusa esperada da chave de acesso (não encontrada / inativa /
    // papel errado / esgotada). Nunca vira 500.
    #[error("Chave de acesso inválida")]
    InvalidAccessKey(InvalidKeyReason),

    // Esperado sob retry de registro: a conta já tem perfil.
    #[error("A conta já possui um perfil")]
    DuplicateProfile,

    #[error("A filial informada está inativa")]
    InactiveBranch,

    // --- Violações de isolamento de tenant: sempre rejeitadas inteiras ---
    #[error("Capster e filial pertencem a organizações diferentes")]
    CrossOrganizationAssignment,

    #[error("O serviço não é oferecido nesta filial")]
    ServiceNotOfferedAtBranch,

    #[error("O capster não está agendável nesta filial")]
    StaffNotBookableAtBranch,

    // Aresta ilegal do ciclo de vida. Carrega o estado atual para o
    // cliente conseguir ressincronizar.
    #[error("Transição ilegal de '{}' para '{}'", from.as_str(), to.as_str())]
    IllegalTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "kind": "VALIDATION",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::EmailAlreadyExists => (
                StatusCode::CONFLICT,
                "EMAIL_ALREADY_EXISTS",
                "Este e-mail já está em uso.".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "E-mail ou senha inválidos.".to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg),

            AppError::UserNotFound => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "Usuário não encontrado.".to_string(),
            ),
            AppError::ProfileNotFound => (
                StatusCode::NOT_FOUND,
                "PROFILE_NOT_FOUND",
                "Perfil não encontrado.".to_string(),
            ),
            AppError::OrganizationNotFound => (
                StatusCode::NOT_FOUND,
                "ORGANIZATION_NOT_FOUND",
                "Organização não encontrada.".to_string(),
            ),
            AppError::BranchNotFound => (
                StatusCode::NOT_FOUND,
                "BRANCH_NOT_FOUND",
                "Filial não encontrada.".to_string(),
            ),
            AppError::CapsterNotFound => (
                StatusCode::NOT_FOUND,
                "CAPSTER_NOT_FOUND",
                "Capster não encontrado.".to_string(),
            ),
            AppError::ServiceNotFound => (
                StatusCode::NOT_FOUND,
                "SERVICE_NOT_FOUND",
                "Serviço não encontrado.".to_string(),
            ),
            AppError::BookingNotFound => (
                StatusCode::NOT_FOUND,
                "BOOKING_NOT_FOUND",
                "Agendamento não encontrado.".to_string(),
            ),
            AppError::AccessKeyNotFound => (
                StatusCode::NOT_FOUND,
                "ACCESS_KEY_NOT_FOUND",
                "Chave de acesso não encontrada.".to_string(),
            ),
            AppError::UniqueConstraintViolation(msg) => {
                (StatusCode::CONFLICT, "UNIQUE_VIOLATION", msg)
            }

            AppError::InvalidAccessKey(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_ACCESS_KEY",
                reason.message().to_string(),
            ),
            AppError::DuplicateProfile => (
                StatusCode::CONFLICT,
                "DUPLICATE_PROFILE",
                "Esta conta já está registrada com um perfil.".to_string(),
            ),
            AppError::InactiveBranch => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INACTIVE_BRANCH",
                "A filial informada está inativa.".to_string(),
            ),

            AppError::CrossOrganizationAssignment => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CROSS_ORGANIZATION_ASSIGNMENT",
                "O capster pertence a outra organização.".to_string(),
            ),
            AppError::ServiceNotOfferedAtBranch => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "SERVICE_NOT_OFFERED_AT_BRANCH",
                "O serviço não é oferecido nesta filial.".to_string(),
            ),
            AppError::StaffNotBookableAtBranch => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "STAFF_NOT_BOOKABLE_AT_BRANCH",
                "O capster não está agendável nesta filial.".to_string(),
            ),

            AppError::IllegalTransition { from, to } => {
                let body = Json(json!({
                    "error": format!(
                        "Transição ilegal de '{}' para '{}'.",
                        from.as_str(),
                        to.as_str()
                    ),
                    "kind": "ILLEGAL_TRANSITION",
                    "currentStatus": from,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe algo genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message, "kind": kind }));
        (status, body).into_response()
    }
}
