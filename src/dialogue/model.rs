//! Session data carried between dialogue turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::ConversationState;
use crate::gateway::{Grupo, Servicio, UserType};

/// Who the user is, filled in as the conversation goes.
///
/// `cedula` is only ever set for students and staff after a successful lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<UserType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cedula: Option<String>,
}

impl UserProfile {
    /// A profile for a freshly chosen category, dropping anything verified before.
    pub fn for_type(user_type: UserType) -> Self {
        Self {
            user_type: Some(user_type),
            ..Self::default()
        }
    }

    /// Cédula and category of a verified student or staff member.
    pub fn verified_identity(&self) -> Option<(&str, UserType)> {
        match (self.cedula.as_deref(), self.user_type) {
            (Some(cedula), Some(user_type)) if user_type != UserType::Externo => {
                Some((cedula, user_type))
            }
            _ => None,
        }
    }
}

/// An in-progress password reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSession {
    pub servicio: Option<Servicio>,
    pub grupo: Option<Grupo>,
    /// Code accepted by `verifyOtp`, sent back as `confirm_data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_issued_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryCounters {
    pub cedula_attempts: u32,
    pub otp_attempts: u32,
}

/// Everything one widget instance knows about its conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: ConversationState,
    pub profile: UserProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset: Option<ResetSession>,
    pub counters: RetryCounters,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `target`. Unexpected transitions are logged, not refused.
    pub fn enter(&mut self, target: ConversationState) {
        if !self.state.can_transition_to(target) {
            tracing::warn!(from = %self.state, to = %target, "Unexpected dialogue transition");
        }
        self.state = target;
    }

    /// When the current OTP was issued, if a reset is in progress.
    pub fn otp_issued_at(&self) -> Option<DateTime<Utc>> {
        self.reset.as_ref().and_then(|r| r.otp_issued_at)
    }

    /// Abandon the reset in progress and its OTP attempt budget.
    pub fn clear_reset(&mut self) {
        self.reset = None;
        self.counters.otp_attempts = 0;
    }

    /// Forget everything and land in `state`.
    pub fn discard(&mut self, state: ConversationState) {
        *self = Self {
            state,
            ..Self::default()
        };
    }
}

/// A message for the renderer: text plus ordered quick-reply labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}
