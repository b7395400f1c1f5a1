// tests/router.rs
//
// Fumaça no router: rotas públicas respondem e rotas protegidas
// recusam requisições sem token, tudo sem tocar no banco (a pool é
// preguiçosa e nunca chega a conectar).

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use barbershop_backend::{config::AppState, handlers::api_router};

fn lazy_router() -> axum::Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/indiferente")
        .expect("connect_lazy não abre conexão nenhuma");
    api_router(AppState::from_pool(pool, "segredo-de-teste".into()))
}

#[tokio::test]
async fn health_check_answers_ok() {
    let app = lazy_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn openapi_document_is_served_as_json() {
    let app = lazy_router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
        .await
        .unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(doc["paths"]["/api/bookings"].is_object());
    assert!(doc["paths"]["/api/access-keys/validate"].is_object());
}

#[tokio::test]
async fn protected_routes_refuse_missing_or_garbage_tokens() {
    for (method, uri) in [
        ("GET", "/api/users/me"),
        ("GET", "/api/bookings/mine"),
        ("GET", "/api/access-keys"),
    ] {
        // Sem Authorization.
        let response = lazy_router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");

        // Com um token que não é um JWT.
        let response = lazy_router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::AUTHORIZATION, "Bearer lixo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}
