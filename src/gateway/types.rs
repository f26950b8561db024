//! Request/response contracts for the chatbot backend.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Category of the person talking to the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Estudiante,
    Servidor,
    Externo,
}

impl UserType {
    /// Parse a free-text answer, ignoring case and surrounding whitespace.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "estudiante" => Some(Self::Estudiante),
            "servidor" => Some(Self::Servidor),
            "externo" => Some(Self::Externo),
            _ => None,
        }
    }

    /// Reset policy group. Externals have no institutional account.
    pub fn grupo(&self) -> Option<Grupo> {
        match self {
            Self::Estudiante => Some(Grupo::Estudiantes),
            Self::Servidor => Some(Grupo::Servidores),
            Self::Externo => None,
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Estudiante => write!(f, "estudiante"),
            Self::Servidor => write!(f, "servidor"),
            Self::Externo => write!(f, "externo"),
        }
    }
}

/// Service whose password can be reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Servicio {
    Wifi,
    Zoom,
}

impl Servicio {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Wifi => "WiFi",
            Self::Zoom => "Zoom",
        }
    }

    /// Backend path of the reset endpoint for this service.
    pub fn reset_path(&self) -> &'static str {
        match self {
            Self::Wifi => "/reset_radius_password",
            Self::Zoom => "/reset_zoom_password",
        }
    }
}

impl std::fmt::Display for Servicio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wifi => write!(f, "wifi"),
            Self::Zoom => write!(f, "zoom"),
        }
    }
}

/// Policy group the reset endpoints expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grupo {
    Estudiantes,
    Servidores,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupUserRequest {
    pub cedula: String,
    pub user_type: UserType,
}

/// Identity returned by a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub nombre: String,
}

/// Shared by `checkAccountExists` and `issueOtp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    pub cedula: String,
    pub user_type: UserType,
    pub servicio: Servicio,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub cedula: String,
    pub otp: String,
}

/// Password reset payload. The new password is only exposed while serializing.
#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest {
    pub username: String,
    pub confirm_data: String,
    #[serde(serialize_with = "expose_secret")]
    pub new_password: SecretString,
    pub grupo: Grupo,
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub pregunta: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub respuesta: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuente: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acciones: Vec<String>,
}

/// Positive acknowledgement of a status-style operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

// ── Wire bodies ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReplyStatus {
    Success,
    Error,
}

/// `{status, message?, detail?}` body returned by the OTP and reset endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatusBody {
    pub status: ReplyStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LookupBody {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExistsBody {
    pub exists: bool,
}
