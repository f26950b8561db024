//! Integration tests for `HttpGateway` against a fake chatbot backend.

use std::time::Duration;

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use campus_assist::error::GatewayError;
use campus_assist::gateway::{
    AccountRequest, Gateway, Grupo, HttpGateway, LookupUserRequest, QueryRequest,
    ResetPasswordRequest, Servicio, UserType, VerifyOtpRequest,
};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn usuario(Json(body): Json<Value>) -> Json<Value> {
    if body["cedula"] == "0102030405" && body["userType"] == "estudiante" {
        Json(json!({ "nombre": "Ana" }))
    } else {
        Json(json!({ "error": "Usuario no encontrado" }))
    }
}

async fn verificar_cuenta(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "exists": body["servicio"] == "wifi" }))
}

async fn enviar_otp() -> Json<Value> {
    Json(json!({ "status": "error", "message": "No se pudo enviar el correo." }))
}

async fn verificar_otp() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": "OTP no encontrado." })),
    )
}

async fn reset_radius(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["new_password"], "NuevaClave123");
    assert_eq!(body["grupo"], "estudiantes");
    Json(json!({ "status": "success", "message": "radius" }))
}

async fn reset_zoom() -> Json<Value> {
    Json(json!({ "status": "success", "message": "zoom" }))
}

async fn query() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

/// Start the fake backend and return its base URL.
async fn start_backend() -> String {
    let app = Router::new()
        .route("/api/chatbot/usuario", post(usuario))
        .route("/api/chatbot/verificar_cuenta", post(verificar_cuenta))
        .route("/api/chatbot/enviar_otp", post(enviar_otp))
        .route("/api/chatbot/verificar_otp", post(verificar_otp))
        .route("/api/chatbot/reset_radius_password", post(reset_radius))
        .route("/api/chatbot/reset_zoom_password", post(reset_zoom))
        .route("/api/chatbot/query", post(query));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}/api/chatbot")
}

fn gateway(base: &str) -> HttpGateway {
    HttpGateway::new(base, Duration::from_secs(2)).unwrap()
}

fn account(servicio: Servicio) -> AccountRequest {
    AccountRequest {
        cedula: "0102030405".to_string(),
        user_type: UserType::Estudiante,
        servicio,
    }
}

#[tokio::test]
async fn test_lookup_user() {
    let base = start_backend().await;
    timeout(TEST_TIMEOUT, async {
        let gw = gateway(&base);
        let found = gw
            .lookup_user(&LookupUserRequest {
                cedula: "0102030405".to_string(),
                user_type: UserType::Estudiante,
            })
            .await
            .unwrap();
        assert_eq!(found.nombre, "Ana");

        let missing = gw
            .lookup_user(&LookupUserRequest {
                cedula: "9999999999".to_string(),
                user_type: UserType::Estudiante,
            })
            .await;
        assert_eq!(
            missing,
            Err(GatewayError::application("Usuario no encontrado"))
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_account_check_and_status_error() {
    let base = start_backend().await;
    timeout(TEST_TIMEOUT, async {
        let gw = gateway(&base);
        assert!(gw.check_account_exists(&account(Servicio::Wifi)).await.unwrap());
        assert!(!gw.check_account_exists(&account(Servicio::Zoom)).await.unwrap());

        let issued = gw.issue_otp(&account(Servicio::Wifi)).await;
        assert_eq!(
            issued,
            Err(GatewayError::application("No se pudo enviar el correo."))
        );
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_detail_rejection_is_application_error() {
    let base = start_backend().await;
    timeout(TEST_TIMEOUT, async {
        let err = gateway(&base)
            .verify_otp(&VerifyOtpRequest {
                cedula: "0102030405".to_string(),
                otp: "000000".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::application("OTP no encontrado."));
        assert!(!err.is_network());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_reset_uses_service_endpoint() {
    let base = start_backend().await;
    timeout(TEST_TIMEOUT, async {
        let gw = gateway(&base);
        let request = ResetPasswordRequest {
            username: "0102030405".to_string(),
            confirm_data: "123456".to_string(),
            new_password: SecretString::from("NuevaClave123".to_string()),
            grupo: Grupo::Estudiantes,
        };
        let wifi = gw.reset_password(Servicio::Wifi, &request).await.unwrap();
        assert_eq!(wifi.message.as_deref(), Some("radius"));
        let zoom = gw.reset_password(Servicio::Zoom, &request).await.unwrap();
        assert_eq!(zoom.message.as_deref(), Some("zoom"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_server_error_without_detail_is_network_error() {
    let base = start_backend().await;
    timeout(TEST_TIMEOUT, async {
        let err = gateway(&base)
            .semantic_query(&QueryRequest {
                pregunta: "horario".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.is_network());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    timeout(TEST_TIMEOUT, async {
        let err = gateway(&format!("http://127.0.0.1:{port}/api/chatbot"))
            .check_account_exists(&account(Servicio::Wifi))
            .await
            .unwrap_err();
        assert!(err.is_network());
    })
    .await
    .expect("test timed out");
}
