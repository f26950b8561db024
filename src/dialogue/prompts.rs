//! User-facing messages of the dialogue.

use super::model::OutgoingMessage;
use crate::error::GatewayError;
use crate::gateway::Servicio;

pub const CATEGORY_OPTIONS: [&str; 3] = ["Estudiante", "Servidor", "Externo"];
pub const SERVICE_OPTIONS: [&str; 4] = ["WiFi", "Zoom", "FAQs", "No, gracias"];

/// Shown for any transport failure, whatever the operation.
pub const CONNECTION_ERROR: &str = "❗ Error de conexión con el servidor.";

pub fn welcome() -> OutgoingMessage {
    OutgoingMessage::text(
        "👋 ¡Hola! Soy tu asistente virtual. Puedo ayudarte a cambiar tu contraseña \
         de WiFi o Zoom y responder tus preguntas frecuentes.",
    )
}

pub fn ask_category() -> OutgoingMessage {
    OutgoingMessage::text("¿Eres estudiante, servidor o externo?").with_options(CATEGORY_OPTIONS)
}

pub fn invalid_category() -> OutgoingMessage {
    OutgoingMessage::text("No reconocí esa opción. Elige Estudiante, Servidor o Externo.")
        .with_options(CATEGORY_OPTIONS)
}

pub fn ask_cedula() -> OutgoingMessage {
    OutgoingMessage::text("Ingresa tu número de cédula (8 a 10 dígitos).")
}

pub fn ask_external_name() -> OutgoingMessage {
    OutgoingMessage::text("😊 ¿Cómo te llamas?")
}

pub fn ask_external_name_again() -> OutgoingMessage {
    OutgoingMessage::text("¡Hola! 😊 ¿Me dices tu nombre?")
}

pub fn greet_external(nombre: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "¡Mucho gusto, {nombre}! 😊 ¿En qué puedo ayudarte hoy?"
    ))
}

pub const INVALID_CEDULA: &str = "❗ La cédula debe tener entre 8 y 10 dígitos numéricos.";

/// Explain a failed attempt and how many are left.
pub fn retry(reason: &str, remaining: u32) -> OutgoingMessage {
    let left = if remaining == 1 {
        "Te queda 1 intento.".to_string()
    } else {
        format!("Te quedan {remaining} intentos.")
    };
    OutgoingMessage::text(format!("{reason} {left}"))
}

pub fn cedula_restart() -> OutgoingMessage {
    OutgoingMessage::text(
        "Superaste el número de intentos para ingresar tu cédula. Empecemos de nuevo.",
    )
}

pub fn verified(nombre: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!("✅ Identidad verificada. ¡Hola, {nombre}!"))
}

pub fn service_menu(nombre: Option<&str>) -> OutgoingMessage {
    let text = match nombre {
        Some(nombre) => format!("{nombre}, ¿con qué servicio necesitas ayuda?"),
        None => "¿Con qué servicio necesitas ayuda?".to_string(),
    };
    OutgoingMessage::text(text).with_options(SERVICE_OPTIONS)
}

pub fn anything_else() -> OutgoingMessage {
    OutgoingMessage::text("¿Necesitas ayuda con algo más?").with_options(SERVICE_OPTIONS)
}

pub fn invalid_service() -> OutgoingMessage {
    OutgoingMessage::text("Elige una opción: WiFi, Zoom, FAQs o No, gracias.")
        .with_options(SERVICE_OPTIONS)
}

/// Services whose passwords are reset on the provider's portal, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfServicePortal {
    Office365,
    Moodle,
}

pub fn self_service_reset(portal: SelfServicePortal) -> OutgoingMessage {
    let text = match portal {
        SelfServicePortal::Office365 => {
            "Puedes restablecer tu contraseña de Office 365 en \
             https://passwordreset.microsoftonline.com/ . Si necesitas ayuda adicional, ingresa a \
             https://portal.office.com y sigue las instrucciones de recuperación."
        }
        SelfServicePortal::Moodle => {
            "Para cambiar tu contraseña de Moodle usa \"¿Olvidaste tu contraseña?\" en \
             https://moodle.unach.edu.ec/login/forgot_password.php"
        }
    };
    OutgoingMessage::text(text)
}

pub fn ask_question() -> OutgoingMessage {
    OutgoingMessage::text("Escribe tu pregunta y buscaré la respuesta. 🔎")
}

pub fn farewell(nombre: Option<&str>) -> OutgoingMessage {
    let text = match nombre {
        Some(nombre) => format!("¡Hasta pronto, {nombre}! Si necesitas algo más, escríbeme."),
        None => "¡Hasta pronto! Si necesitas algo más, escríbeme.".to_string(),
    };
    OutgoingMessage::text(text)
}

pub fn identity_required() -> OutgoingMessage {
    OutgoingMessage::text("Para cambiar una contraseña primero necesito verificar tu identidad.")
}

pub fn account_missing(servicio: Servicio) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "❗ No encontramos una cuenta de {} asociada a tu cédula.",
        servicio.label()
    ))
}

pub fn otp_sent(servicio: Servicio, detail: Option<&str>, countdown: &str) -> OutgoingMessage {
    let sent = detail.unwrap_or("Código OTP enviado.");
    OutgoingMessage::text(format!(
        "✅ {sent} Ingresa el código OTP que llegó a tu correo institucional para cambiar \
         tu contraseña de {}. ⏳ Tiempo restante: {countdown}",
        servicio.label()
    ))
}

pub fn otp_expired() -> OutgoingMessage {
    OutgoingMessage::text(
        "⌛ El código OTP ha expirado. Elige el servicio nuevamente para recibir un código nuevo.",
    )
    .with_options(SERVICE_OPTIONS)
}

pub fn otp_retry(reason: &str, remaining: u32, countdown: &str) -> OutgoingMessage {
    let mut msg = retry(reason, remaining);
    msg.text.push_str(&format!(" ⏳ Tiempo restante: {countdown}"));
    msg
}

pub fn otp_restart() -> OutgoingMessage {
    OutgoingMessage::text("Superaste el número de intentos para el código OTP.")
}

pub fn ask_new_password(countdown: &str) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "✅ OTP verificado. Ingresa tu nueva contraseña. ⏳ Tiempo restante: {countdown}"
    ))
}

pub fn reset_done(nombre: Option<&str>, detail: Option<&str>) -> OutgoingMessage {
    let who = nombre.map(|n| format!(", {n}")).unwrap_or_default();
    let detail = detail.unwrap_or("Tu contraseña fue actualizada correctamente.");
    OutgoingMessage::text(format!("✅ ¡Listo{who}! {detail}"))
}

/// One fixed wording per error kind.
pub fn failure_text(error: &GatewayError) -> String {
    match error {
        GatewayError::Network { .. } => CONNECTION_ERROR.to_string(),
        GatewayError::Application { detail } => format!("❗ Error: {detail}"),
    }
}

pub fn failure(error: &GatewayError) -> OutgoingMessage {
    OutgoingMessage::text(failure_text(error))
}
