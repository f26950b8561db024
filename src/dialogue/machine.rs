//! DialogueMachine: turns one user input into the next session and the
//! messages to show.
//!
//! The session goes in by value and comes back in the [`Turn`]. A handler
//! awaits at most one gateway call at a time, so a session never has two
//! backend requests in flight.

use std::sync::Arc;

use chrono::TimeDelta;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use super::model::{OutgoingMessage, ResetSession, Session, UserProfile};
use super::names::{extract_name, is_greeting_only};
use super::otp::{Clock, OtpLifecycle, format_countdown};
use super::prompts::{self, SelfServicePortal};
use super::retry::{RetryOutcome, RetryPolicy};
use super::router;
use super::state::ConversationState;
use crate::config::AssistConfig;
use crate::error::ConfigError;
use crate::gateway::{
    AccountRequest, Gateway, LookupUserRequest, ResetPasswordRequest, Servicio, UserType,
    VerifyOtpRequest,
};

/// Outcome of handling one input.
#[derive(Debug, Clone)]
pub struct Turn {
    pub session: Session,
    pub messages: Vec<OutgoingMessage>,
}

impl Turn {
    /// Quick replies to display now: those of the last message.
    pub fn options(&self) -> &[String] {
        self.messages
            .last()
            .map(|m| m.options.as_slice())
            .unwrap_or(&[])
    }
}

/// Answer accepted while choosing a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServiceChoice {
    Reset(Servicio),
    /// Accounts the user resets on the provider's own portal.
    SelfService(SelfServicePortal),
    Faqs,
    Decline,
}

impl ServiceChoice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "wifi" | "wi-fi" => Some(Self::Reset(Servicio::Wifi)),
            "zoom" => Some(Self::Reset(Servicio::Zoom)),
            "office365" | "office 365" => Some(Self::SelfService(SelfServicePortal::Office365)),
            "moodle" => Some(Self::SelfService(SelfServicePortal::Moodle)),
            "faqs" | "faq" | "preguntas frecuentes" => Some(Self::Faqs),
            "no, gracias" | "no gracias" | "no" => Some(Self::Decline),
            _ => None,
        }
    }
}

fn is_valid_cedula(input: &str) -> bool {
    (8..=10).contains(&input.len()) && input.bytes().all(|b| b.is_ascii_digit())
}

/// The dialogue state machine.
pub struct DialogueMachine {
    gateway: Arc<dyn Gateway>,
    otp: OtpLifecycle,
    cedula_retry: RetryPolicy,
    otp_retry: RetryPolicy,
}

impl DialogueMachine {
    pub fn new(gateway: Arc<dyn Gateway>, otp: OtpLifecycle, max_attempts: u32) -> Self {
        Self {
            gateway,
            otp,
            cedula_retry: RetryPolicy::new(max_attempts, ConversationState::Tipo),
            otp_retry: RetryPolicy::new(max_attempts, ConversationState::Servicio),
        }
    }

    pub fn from_config(
        config: &AssistConfig,
        gateway: Arc<dyn Gateway>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let ttl = TimeDelta::from_std(config.otp_ttl).map_err(|e| ConfigError::InvalidValue {
            key: "CAMPUS_ASSIST_OTP_TTL_SECS".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::new(
            gateway,
            OtpLifecycle::new(ttl, clock),
            config.max_attempts,
        ))
    }

    /// Opening messages for a fresh session.
    pub fn greeting(&self) -> Vec<OutgoingMessage> {
        vec![prompts::welcome(), prompts::ask_category()]
    }

    /// Handle one raw input. Empty input leaves the session untouched.
    pub async fn handle(&self, mut session: Session, input: &str) -> Turn {
        let input = input.trim();
        if input.is_empty() {
            return Turn {
                session,
                messages: Vec::new(),
            };
        }

        let from = session.state;
        let messages = match session.state {
            ConversationState::Tipo => self.on_tipo(&mut session, input),
            ConversationState::Cedula => self.on_cedula(&mut session, input).await,
            ConversationState::NombreExterno => self.on_nombre_externo(&mut session, input),
            ConversationState::Servicio => self.on_servicio(&mut session, input).await,
            ConversationState::Otp => self.on_otp(&mut session, input).await,
            ConversationState::Pass => self.on_pass(&mut session, input).await,
            ConversationState::Idle => self.on_idle(&mut session, input).await,
        };

        if from != session.state {
            info!(from = %from, to = %session.state, "Dialogue transition");
        } else {
            debug!(state = %from, "Dialogue re-prompt");
        }

        Turn { session, messages }
    }

    fn on_tipo(&self, session: &mut Session, input: &str) -> Vec<OutgoingMessage> {
        match UserType::parse(input) {
            Some(UserType::Externo) => {
                session.profile = UserProfile::for_type(UserType::Externo);
                session.enter(ConversationState::NombreExterno);
                vec![prompts::ask_external_name()]
            }
            Some(user_type) => {
                session.profile = UserProfile::for_type(user_type);
                session.counters.cedula_attempts = 0;
                session.enter(ConversationState::Cedula);
                vec![prompts::ask_cedula()]
            }
            None => vec![prompts::invalid_category()],
        }
    }

    async fn on_cedula(&self, session: &mut Session, input: &str) -> Vec<OutgoingMessage> {
        let Some(user_type) = session.profile.user_type else {
            session.enter(ConversationState::Tipo);
            return vec![prompts::ask_category()];
        };

        let lookup = if is_valid_cedula(input) {
            let request = LookupUserRequest {
                cedula: input.to_string(),
                user_type,
            };
            match self.gateway.lookup_user(&request).await {
                Ok(record) => Ok((request.cedula, record.nombre)),
                Err(e) => {
                    warn!(error = %e, user_type = %user_type, "Cédula lookup failed");
                    Err(prompts::failure_text(&e))
                }
            }
        } else {
            Err(prompts::INVALID_CEDULA.to_string())
        };

        match self
            .cedula_retry
            .check(lookup, &mut session.counters.cedula_attempts)
        {
            RetryOutcome::Proceed((cedula, nombre)) => {
                session.profile.cedula = Some(cedula);
                session.profile.nombre = Some(nombre.clone());
                session.enter(ConversationState::Servicio);
                vec![
                    prompts::verified(&nombre),
                    prompts::service_menu(Some(&nombre)),
                ]
            }
            RetryOutcome::Retry { reason, remaining } => vec![prompts::retry(&reason, remaining)],
            RetryOutcome::Exhausted { reason, anchor } => {
                info!(
                    threshold = self.cedula_retry.threshold(),
                    "Cédula attempts exhausted"
                );
                session.profile = UserProfile::default();
                session.enter(anchor);
                vec![
                    OutgoingMessage::text(reason),
                    prompts::cedula_restart(),
                    prompts::ask_category(),
                ]
            }
        }
    }

    fn on_nombre_externo(&self, session: &mut Session, input: &str) -> Vec<OutgoingMessage> {
        let nombre = match extract_name(input) {
            Some(nombre) => nombre,
            None if is_greeting_only(input) => return vec![prompts::ask_external_name_again()],
            None => input.to_string(),
        };
        session.profile.nombre = Some(nombre.clone());
        session.enter(ConversationState::Idle);
        vec![prompts::greet_external(&nombre)]
    }

    async fn on_servicio(&self, session: &mut Session, input: &str) -> Vec<OutgoingMessage> {
        match ServiceChoice::parse(input) {
            Some(ServiceChoice::Reset(servicio)) => self.start_reset(session, servicio).await,
            Some(ServiceChoice::SelfService(portal)) => vec![
                prompts::self_service_reset(portal),
                prompts::service_menu(session.profile.nombre.as_deref()),
            ],
            Some(ServiceChoice::Faqs) => {
                session.clear_reset();
                session.enter(ConversationState::Idle);
                vec![prompts::ask_question()]
            }
            Some(ServiceChoice::Decline) => {
                let nombre = session.profile.nombre.take();
                session.discard(ConversationState::Idle);
                vec![prompts::farewell(nombre.as_deref())]
            }
            None => vec![prompts::invalid_service()],
        }
    }

    /// Verify the account exists, then have the backend mail an OTP.
    async fn start_reset(&self, session: &mut Session, servicio: Servicio) -> Vec<OutgoingMessage> {
        let Some((cedula, user_type)) = session
            .profile
            .verified_identity()
            .map(|(cedula, user_type)| (cedula.to_string(), user_type))
        else {
            session.clear_reset();
            session.enter(ConversationState::Tipo);
            return vec![prompts::identity_required(), prompts::ask_category()];
        };

        session.clear_reset();
        session.reset = Some(ResetSession {
            servicio: Some(servicio),
            grupo: user_type.grupo(),
            ..ResetSession::default()
        });

        let request = AccountRequest {
            cedula,
            user_type,
            servicio,
        };
        let failure = match self.gateway.check_account_exists(&request).await {
            Ok(true) => match self.gateway.issue_otp(&request).await {
                Ok(ack) => {
                    let issued_at = self.otp.issue();
                    if let Some(reset) = session.reset.as_mut() {
                        reset.otp_issued_at = Some(issued_at);
                    }
                    session.enter(ConversationState::Otp);
                    info!(servicio = %servicio, "OTP issued");
                    let countdown = format_countdown(self.otp.ttl());
                    return vec![prompts::otp_sent(
                        servicio,
                        ack.message.as_deref(),
                        &countdown,
                    )];
                }
                Err(e) => {
                    warn!(error = %e, servicio = %servicio, "OTP issuance failed");
                    prompts::failure(&e)
                }
            },
            Ok(false) => {
                info!(servicio = %servicio, "No account for service");
                prompts::account_missing(servicio)
            }
            Err(e) => {
                warn!(error = %e, servicio = %servicio, "Account check failed");
                prompts::failure(&e)
            }
        };

        session.clear_reset();
        session.enter(ConversationState::Servicio);
        vec![
            failure,
            prompts::service_menu(session.profile.nombre.as_deref()),
        ]
    }

    async fn on_otp(&self, session: &mut Session, input: &str) -> Vec<OutgoingMessage> {
        let now = self.otp.now();
        let issued_at = match session.otp_issued_at() {
            Some(issued_at) if !self.otp.is_expired(now, issued_at) => issued_at,
            _ => {
                info!("OTP expired before verification");
                return self.expire_reset(session);
            }
        };
        let Some((cedula, _)) = session.profile.verified_identity() else {
            session.clear_reset();
            session.enter(ConversationState::Tipo);
            return vec![prompts::identity_required(), prompts::ask_category()];
        };

        let request = VerifyOtpRequest {
            cedula: cedula.to_string(),
            otp: input.to_string(),
        };
        let countdown = format_countdown(self.otp.remaining(now, issued_at));
        let verification = match self.gateway.verify_otp(&request).await {
            Ok(_) => Ok(request.otp),
            Err(e) => {
                warn!(error = %e, "OTP verification failed");
                Err(prompts::failure_text(&e))
            }
        };
        match self
            .otp_retry
            .check(verification, &mut session.counters.otp_attempts)
        {
            RetryOutcome::Proceed(otp) => {
                if let Some(reset) = session.reset.as_mut() {
                    reset.otp = Some(otp);
                }
                session.enter(ConversationState::Pass);
                vec![prompts::ask_new_password(&countdown)]
            }
            RetryOutcome::Retry { reason, remaining } => {
                vec![prompts::otp_retry(&reason, remaining, &countdown)]
            }
            RetryOutcome::Exhausted { reason, anchor } => {
                info!(
                    threshold = self.otp_retry.threshold(),
                    "OTP attempts exhausted"
                );
                session.clear_reset();
                session.enter(anchor);
                vec![
                    OutgoingMessage::text(reason),
                    prompts::otp_restart(),
                    prompts::service_menu(session.profile.nombre.as_deref()),
                ]
            }
        }
    }

    async fn on_pass(&self, session: &mut Session, input: &str) -> Vec<OutgoingMessage> {
        let now = self.otp.now();
        let pending = session.reset.as_ref().and_then(|reset| {
            Some((
                reset.servicio?,
                reset.grupo?,
                reset.otp.clone()?,
                reset.otp_issued_at?,
            ))
        });
        let Some((servicio, grupo, otp, issued_at)) = pending else {
            warn!("Password entry without a verified OTP");
            return self.expire_reset(session);
        };
        if self.otp.is_expired(now, issued_at) {
            info!("OTP expired before password reset");
            return self.expire_reset(session);
        }
        let Some((cedula, _)) = session.profile.verified_identity() else {
            session.clear_reset();
            session.enter(ConversationState::Tipo);
            return vec![prompts::identity_required(), prompts::ask_category()];
        };

        let request = ResetPasswordRequest {
            username: cedula.to_string(),
            confirm_data: otp,
            new_password: SecretString::from(input.to_string()),
            grupo,
        };
        let result = self.gateway.reset_password(servicio, &request).await;
        session.clear_reset();
        session.counters = Default::default();
        match result {
            Ok(ack) => {
                info!(servicio = %servicio, "Password reset completed");
                session.enter(ConversationState::Servicio);
                vec![
                    prompts::reset_done(session.profile.nombre.as_deref(), ack.message.as_deref()),
                    prompts::anything_else(),
                ]
            }
            Err(e) => {
                warn!(error = %e, servicio = %servicio, "Password reset failed");
                session.discard(ConversationState::Idle);
                vec![prompts::failure(&e)]
            }
        }
    }

    async fn on_idle(&self, session: &mut Session, input: &str) -> Vec<OutgoingMessage> {
        let routed = router::route(self.gateway.as_ref(), &session.profile, input).await;
        session.enter(routed.next);
        routed.messages
    }

    /// Drop an expired or inconsistent reset and offer the service menu.
    fn expire_reset(&self, session: &mut Session) -> Vec<OutgoingMessage> {
        session.clear_reset();
        session.enter(ConversationState::Servicio);
        vec![prompts::otp_expired()]
    }
}
