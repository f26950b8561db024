//! Backend gateway: the six remote operations the dialogue depends on.
//!
//! The gateway owns no state. `HttpGateway` talks JSON to the chatbot
//! backend; tests substitute their own implementation of [`Gateway`].

pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod scripted;

pub use http::HttpGateway;
pub use types::{
    AccountRequest, Ack, Grupo, LookupUserRequest, QueryRequest, QueryResponse,
    ResetPasswordRequest, Servicio, UserRecord, UserType, VerifyOtpRequest,
};

use async_trait::async_trait;

use crate::error::GatewayError;

/// Remote capabilities used by the dialogue state machine.
///
/// Every call may fail with [`GatewayError::Network`] (the call did not
/// complete) or [`GatewayError::Application`] (the backend rejected it).
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Resolve a cédula to the person's name.
    async fn lookup_user(&self, request: &LookupUserRequest) -> Result<UserRecord, GatewayError>;

    /// Whether the person has an account on the requested service.
    async fn check_account_exists(&self, request: &AccountRequest) -> Result<bool, GatewayError>;

    /// Send a one-time code to the person's institutional mailbox.
    async fn issue_otp(&self, request: &AccountRequest) -> Result<Ack, GatewayError>;

    async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<Ack, GatewayError>;

    /// Reset the password on the service-specific endpoint.
    async fn reset_password(
        &self,
        servicio: Servicio,
        request: &ResetPasswordRequest,
    ) -> Result<Ack, GatewayError>;

    /// Free-text FAQ search.
    async fn semantic_query(&self, request: &QueryRequest) -> Result<QueryResponse, GatewayError>;
}
