//! HTTP gateway: JSON POSTs against the chatbot backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::Gateway;
use super::types::{
    AccountRequest, Ack, ExistsBody, LookupBody, LookupUserRequest, QueryRequest, QueryResponse,
    ReplyStatus, ResetPasswordRequest, Servicio, StatusBody, UserRecord, VerifyOtpRequest,
};
use crate::error::GatewayError;

/// Gateway backed by the chatbot REST API.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::network("client", e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST a JSON body and decode the JSON reply.
    ///
    /// Non-2xx replies carrying a `detail` field are business rejections;
    /// anything else that goes wrong is a network failure.
    async fn post<B, R>(&self, operation: &str, path: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(operation, error = %e, "Backend request failed");
                GatewayError::network(operation, e.to_string())
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::network(operation, e.to_string()))?;

        if !status.is_success() {
            debug!(operation, status = %status, "Backend returned error status");
            return Err(match rejection_detail(&text) {
                Some(detail) => GatewayError::application(detail),
                None => GatewayError::network(operation, format!("HTTP {status}")),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(operation, error = %e, "Undecodable backend response");
            GatewayError::network(operation, format!("invalid response body: {e}"))
        })
    }
}

/// Extract FastAPI's `{"detail": ...}` from an error body.
fn rejection_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        // Request validation errors come back as a list of objects.
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect::<Vec<_>>()
                .join("; "),
        )
        .filter(|s| !s.is_empty())
        .or_else(|| Some("Solicitud inválida.".to_string())),
        _ => None,
    }
}

fn into_ack(body: StatusBody) -> Result<Ack, GatewayError> {
    match body.status {
        ReplyStatus::Success => Ok(Ack {
            message: body.message,
        }),
        ReplyStatus::Error => Err(GatewayError::application(
            body.detail
                .or(body.message)
                .unwrap_or_else(|| "La operación no pudo completarse.".to_string()),
        )),
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn lookup_user(&self, request: &LookupUserRequest) -> Result<UserRecord, GatewayError> {
        let body: LookupBody = self.post("lookup_user", "/usuario", request).await?;
        match (body.nombre, body.error) {
            (_, Some(error)) => Err(GatewayError::application(error)),
            (Some(nombre), None) => Ok(UserRecord { nombre }),
            (None, None) => Err(GatewayError::application("Usuario no encontrado.")),
        }
    }

    async fn check_account_exists(&self, request: &AccountRequest) -> Result<bool, GatewayError> {
        let body: ExistsBody = self
            .post("check_account_exists", "/verificar_cuenta", request)
            .await?;
        Ok(body.exists)
    }

    async fn issue_otp(&self, request: &AccountRequest) -> Result<Ack, GatewayError> {
        let body: StatusBody = self.post("issue_otp", "/enviar_otp", request).await?;
        into_ack(body)
    }

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Ack, GatewayError> {
        let body: StatusBody = self.post("verify_otp", "/verificar_otp", request).await?;
        into_ack(body)
    }

    async fn reset_password(
        &self,
        servicio: Servicio,
        request: &ResetPasswordRequest,
    ) -> Result<Ack, GatewayError> {
        let body: StatusBody = self
            .post("reset_password", servicio.reset_path(), request)
            .await?;
        into_ack(body)
    }

    async fn semantic_query(&self, request: &QueryRequest) -> Result<QueryResponse, GatewayError> {
        self.post("semantic_query", "/query", request).await
    }
}
