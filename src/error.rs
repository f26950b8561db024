//! Error types for Campus Assist.

/// Error surfaced by a channel while driving a conversation.
///
/// Gateway failures never appear here: the dialogue turns them into messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures of a backend gateway call.
///
/// The dialogue recovers from both variants; they differ only in the
/// message the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The call did not complete (connection refused, timeout, undecodable body).
    #[error("Network error calling {operation}: {reason}")]
    Network { operation: String, reason: String },

    /// The backend answered with a well-formed business rejection.
    #[error("{detail}")]
    Application { detail: String },
}

impl GatewayError {
    pub fn network(operation: &str, reason: impl Into<String>) -> Self {
        Self::Network {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn application(detail: impl Into<String>) -> Self {
        Self::Application {
            detail: detail.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_displays_detail_only() {
        let err = GatewayError::application("No se encontró correo para esta cédula.");
        assert_eq!(err.to_string(), "No se encontró correo para esta cédula.");
        assert!(!err.is_network());
    }

    #[test]
    fn network_error_names_operation() {
        let err = GatewayError::network("verify_otp", "connection refused");
        assert!(err.is_network());
        assert!(err.to_string().contains("verify_otp"));
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let err: Error = std::io::Error::other("broken pipe").into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "IO error: broken pipe");
    }
}
