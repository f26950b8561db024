//! Free-form query router: FAQ fallback for input no state claims.

use tracing::{debug, warn};

use super::model::{OutgoingMessage, UserProfile};
use super::prompts;
use super::state::ConversationState;
use crate::gateway::{Gateway, QueryRequest, QueryResponse};

/// Classification the backend attaches to an answer through `fuente`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTag {
    /// "Saludo": the user said hello.
    Greeting,
    /// "Manejo especial": the user asked about changing a password.
    SpecialHandling,
    Other,
}

impl QueryTag {
    pub fn from_fuente(fuente: Option<&str>) -> Self {
        match fuente.map(str::trim) {
            Some("Saludo") => Self::Greeting,
            Some("Manejo especial") => Self::SpecialHandling,
            _ => Self::Other,
        }
    }

    /// State the dialogue continues in after an answer with this tag.
    pub fn next_state(&self) -> ConversationState {
        match self {
            Self::Greeting => ConversationState::Tipo,
            Self::SpecialHandling => ConversationState::Servicio,
            Self::Other => ConversationState::Idle,
        }
    }
}

/// Where free text led and what to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routed {
    pub next: ConversationState,
    pub messages: Vec<OutgoingMessage>,
}

/// Send free text to FAQ search and decide whether to re-enter a flow.
pub async fn route(gateway: &dyn Gateway, profile: &UserProfile, text: &str) -> Routed {
    let request = QueryRequest {
        pregunta: text.to_string(),
    };
    match gateway.semantic_query(&request).await {
        Ok(response) => {
            let tag = QueryTag::from_fuente(response.fuente.as_deref());
            debug!(tag = ?tag, fuente = ?response.fuente, "Free-text query answered");
            let mut messages = vec![answer(&response, tag)];
            match tag {
                QueryTag::Greeting => messages.push(prompts::ask_category()),
                QueryTag::SpecialHandling => {
                    messages.push(prompts::service_menu(profile.nombre.as_deref()))
                }
                QueryTag::Other => {}
            }
            Routed {
                next: tag.next_state(),
                messages,
            }
        }
        Err(e) => {
            warn!(error = %e, "Free-text query failed");
            Routed {
                next: ConversationState::Idle,
                messages: vec![prompts::failure(&e)],
            }
        }
    }
}

fn answer(response: &QueryResponse, tag: QueryTag) -> OutgoingMessage {
    let mut text = if response.respuesta.trim().is_empty() {
        "Lo siento, hubo un problema.".to_string()
    } else {
        response.respuesta.clone()
    };
    if tag == QueryTag::Other {
        if let Some(fuente) = response.fuente.as_deref().filter(|f| !f.is_empty()) {
            text.push_str(&format!("\n🔎 Fuente: {fuente}"));
        }
    }
    OutgoingMessage::text(text).with_options(response.acciones.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::scripted::ScriptedGateway;

    fn gateway_answering(respuesta: &str, fuente: Option<&str>, acciones: &[&str]) -> ScriptedGateway {
        let mut gateway = ScriptedGateway::new();
        gateway.query_result = Ok(QueryResponse {
            respuesta: respuesta.to_string(),
            fuente: fuente.map(String::from),
            acciones: acciones.iter().map(|a| a.to_string()).collect(),
        });
        gateway
    }

    #[test]
    fn tags_from_fuente() {
        assert_eq!(QueryTag::from_fuente(Some("Saludo")), QueryTag::Greeting);
        assert_eq!(
            QueryTag::from_fuente(Some("Manejo especial")),
            QueryTag::SpecialHandling
        );
        assert_eq!(QueryTag::from_fuente(Some("FAQ BD")), QueryTag::Other);
        assert_eq!(QueryTag::from_fuente(None), QueryTag::Other);
    }

    #[tokio::test]
    async fn greeting_reenters_category_choice() {
        let gateway = gateway_answering("👋 ¡Hola!", Some("Saludo"), &[]);
        let routed = route(&gateway, &UserProfile::default(), "hola").await;
        assert_eq!(routed.next, ConversationState::Tipo);
        let last = routed.messages.last().unwrap();
        assert_eq!(last.options, prompts::CATEGORY_OPTIONS);
    }

    #[tokio::test]
    async fn special_handling_reenters_service_menu_and_relays_actions() {
        let gateway = gateway_answering(
            "Para cambiar tu contraseña, selecciona una opción:",
            Some("Manejo especial"),
            &["wifi", "office365", "moodle", "zoom"],
        );
        let routed = route(&gateway, &UserProfile::default(), "olvidé mi clave").await;
        assert_eq!(routed.next, ConversationState::Servicio);
        assert_eq!(
            routed.messages[0].options,
            vec!["wifi", "office365", "moodle", "zoom"]
        );
        assert_eq!(routed.messages[1].options, prompts::SERVICE_OPTIONS);
    }

    #[tokio::test]
    async fn other_answers_stay_idle_and_cite_source() {
        let gateway = gateway_answering("Abre a las 7:00.", Some("FAQ BD"), &[]);
        let routed = route(&gateway, &UserProfile::default(), "horario").await;
        assert_eq!(routed.next, ConversationState::Idle);
        assert_eq!(routed.messages.len(), 1);
        assert_eq!(routed.messages[0].text, "Abre a las 7:00.\n🔎 Fuente: FAQ BD");
    }

    #[tokio::test]
    async fn empty_answer_gets_fallback_text() {
        let gateway = gateway_answering("  ", None, &[]);
        let routed = route(&gateway, &UserProfile::default(), "???").await;
        assert_eq!(routed.messages[0].text, "Lo siento, hubo un problema.");
    }

    #[tokio::test]
    async fn failure_stays_idle() {
        let mut gateway = ScriptedGateway::new();
        gateway.query_result = Err(GatewayError::network("semantic_query", "timeout"));
        let routed = route(&gateway, &UserProfile::default(), "horario").await;
        assert_eq!(routed.next, ConversationState::Idle);
        assert_eq!(routed.messages[0].text, prompts::CONNECTION_ERROR);
    }
}
