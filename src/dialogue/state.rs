//! Conversation state: which answer the assistant is waiting for.

use serde::{Deserialize, Serialize};

/// What the dialogue expects from the next user input.
///
/// Starts at `Tipo`. `Idle` means no structured expectation: input goes to
/// FAQ search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Tipo,
    Cedula,
    NombreExterno,
    Servicio,
    Otp,
    Pass,
    Idle,
}

impl ConversationState {
    /// Check if a transition from `self` to `target` is valid.
    ///
    /// Staying in the same state (a re-prompt) is always valid.
    pub fn can_transition_to(&self, target: ConversationState) -> bool {
        use ConversationState::*;
        *self == target
            || matches!(
                (self, target),
                (Tipo, Cedula)
                    | (Tipo, NombreExterno)
                    | (Cedula, Servicio)
                    | (Cedula, Tipo)
                    | (NombreExterno, Idle)
                    | (Servicio, Otp)
                    | (Servicio, Idle)
                    | (Servicio, Tipo)
                    | (Otp, Pass)
                    | (Otp, Servicio)
                    | (Otp, Tipo)
                    | (Pass, Servicio)
                    | (Pass, Idle)
                    | (Pass, Tipo)
                    | (Idle, Tipo)
                    | (Idle, Servicio)
            )
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::Tipo
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Tipo => "tipo",
            Self::Cedula => "cedula",
            Self::NombreExterno => "nombre_externo",
            Self::Servicio => "servicio",
            Self::Otp => "otp",
            Self::Pass => "pass",
            Self::Idle => "idle",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ConversationState; 7] = [
        ConversationState::Tipo,
        ConversationState::Cedula,
        ConversationState::NombreExterno,
        ConversationState::Servicio,
        ConversationState::Otp,
        ConversationState::Pass,
        ConversationState::Idle,
    ];

    #[test]
    fn valid_transitions() {
        use ConversationState::*;
        let transitions = [
            (Tipo, Cedula),
            (Tipo, NombreExterno),
            (Cedula, Servicio),
            (Cedula, Tipo),
            (NombreExterno, Idle),
            (Servicio, Otp),
            (Otp, Pass),
            (Otp, Servicio),
            (Pass, Servicio),
            (Idle, Tipo),
            (Idle, Servicio),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use ConversationState::*;
        // Skipping verification
        assert!(!Tipo.can_transition_to(Servicio));
        assert!(!Cedula.can_transition_to(Otp));
        assert!(!Servicio.can_transition_to(Pass));
        // Free text never jumps into the reset flow
        assert!(!Idle.can_transition_to(Otp));
        assert!(!Idle.can_transition_to(Pass));
        // Externals never enter cédula entry
        assert!(!NombreExterno.can_transition_to(Cedula));
    }

    #[test]
    fn re_prompt_is_always_valid() {
        for state in ALL {
            assert!(state.can_transition_to(state));
        }
    }

    #[test]
    fn default_is_tipo() {
        assert_eq!(ConversationState::default(), ConversationState::Tipo);
    }

    #[test]
    fn display_matches_serde() {
        for state in ALL {
            let display = format!("{state}");
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(
                format!("\"{display}\""),
                json,
                "Display and serde should match for {state:?}"
            );
        }
    }
}
