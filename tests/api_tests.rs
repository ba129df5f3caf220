use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::Json;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["service"], "roadside-assistance");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/chamado/current")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_create_chamado_rejects_malformed_body() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chamado")
                .header(header::AUTHORIZATION, "Bearer test-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Payload quebrado nunca deve virar erro 500
    assert_ne!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::builder().uri("/api/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Helper: app de teste espelhando a superfície pública, sem banco
fn create_test_app() -> axum::Router {
    axum::Router::new()
        .route(
            "/health",
            get(|| async {
                Json(json!({
                    "service": "roadside-assistance",
                    "status": "healthy",
                }))
            }),
        )
        .route(
            "/api/chamado/current",
            get(|request: Request<Body>| async move {
                match request.headers().get(header::AUTHORIZATION) {
                    Some(_) => (StatusCode::OK, Json(json!(null))),
                    None => (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({
                            "error": "Unauthorized",
                            "message": "Token de autorização requerido",
                            "code": "UNAUTHORIZED",
                        })),
                    ),
                }
            }),
        )
        .route(
            "/api/chamado",
            post(|body: String| async move {
                match serde_json::from_str::<serde_json::Value>(&body) {
                    Ok(_) => (StatusCode::OK, Json(json!({"success": true}))),
                    Err(_) => (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Validation Error",
                            "code": "VALIDATION_ERROR",
                        })),
                    ),
                }
            }),
        )
}
