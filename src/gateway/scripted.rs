//! In-memory gateway for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::Gateway;
use super::types::{
    AccountRequest, Ack, LookupUserRequest, QueryRequest, QueryResponse, ResetPasswordRequest,
    Servicio, UserRecord, VerifyOtpRequest,
};
use crate::error::GatewayError;

pub(crate) const KNOWN_CEDULA: &str = "0102030405";
pub(crate) const VALID_OTP: &str = "123456";

/// Answers every call from fixed data and records the operation names.
pub(crate) struct ScriptedGateway {
    pub users: HashMap<String, String>,
    pub account_exists: bool,
    pub issue_result: Result<Ack, GatewayError>,
    pub valid_otp: String,
    pub reset_result: Result<Ack, GatewayError>,
    pub query_result: Result<QueryResponse, GatewayError>,
    pub network_down: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            users: HashMap::from([(KNOWN_CEDULA.to_string(), "Ana".to_string())]),
            account_exists: true,
            issue_result: Ok(Ack {
                message: Some("OTP enviado a ana@unach.edu.ec.".to_string()),
            }),
            valid_otp: VALID_OTP.to_string(),
            reset_result: Ok(Ack {
                message: Some("Contraseña actualizada correctamente.".to_string()),
            }),
            query_result: Ok(QueryResponse {
                respuesta: "El campus abre a las 7:00.".to_string(),
                fuente: Some("FAQ BD".to_string()),
                acciones: Vec::new(),
            }),
            network_down: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, operation: &str) -> Result<(), GatewayError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(operation.to_string());
        }
        if self.network_down {
            return Err(GatewayError::network(operation, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn lookup_user(&self, request: &LookupUserRequest) -> Result<UserRecord, GatewayError> {
        self.record("lookup_user")?;
        self.users
            .get(&request.cedula)
            .map(|nombre| UserRecord {
                nombre: nombre.clone(),
            })
            .ok_or_else(|| GatewayError::application("Usuario no encontrado."))
    }

    async fn check_account_exists(&self, _request: &AccountRequest) -> Result<bool, GatewayError> {
        self.record("check_account_exists")?;
        Ok(self.account_exists)
    }

    async fn issue_otp(&self, _request: &AccountRequest) -> Result<Ack, GatewayError> {
        self.record("issue_otp")?;
        self.issue_result.clone()
    }

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Ack, GatewayError> {
        self.record("verify_otp")?;
        if request.otp == self.valid_otp {
            Ok(Ack::default())
        } else {
            Err(GatewayError::application("OTP no encontrado."))
        }
    }

    async fn reset_password(
        &self,
        servicio: Servicio,
        _request: &ResetPasswordRequest,
    ) -> Result<Ack, GatewayError> {
        self.record(&format!("reset_password:{servicio}"))?;
        self.reset_result.clone()
    }

    async fn semantic_query(&self, _request: &QueryRequest) -> Result<QueryResponse, GatewayError> {
        self.record("semantic_query")?;
        self.query_result.clone()
    }
}
