//! Name extraction for external visitors.

use std::sync::LazyLock;

use regex::Regex;

const LETTERS: &str = "A-Za-zÁÉÍÓÚÜáéíóúüñÑ";

static INTRO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["me llamo", "soy", "mi nombre es"]
        .iter()
        .map(|lead| Regex::new(&format!(r"(?i)\b{lead}\s+([{LETTERS}]+)")).unwrap())
        .collect()
});

static SINGLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^[{LETTERS}]+$")).unwrap());

/// Greetings people type where a name was expected.
const NOT_NAMES: [&str; 10] = [
    "hola", "buenos", "buenas", "días", "dias", "tardes", "noches", "saludos", "hello", "hi",
];

/// Pull a first name out of "me llamo Ana", "soy ana" or a lone "ANA".
pub fn extract_name(text: &str) -> Option<String> {
    let text = text.trim();
    for pattern in INTRO_PATTERNS.iter() {
        if let Some(name) = pattern.captures(text).and_then(|c| c.get(1)) {
            if !is_greeting(name.as_str()) {
                return Some(capitalize(name.as_str()));
            }
        }
    }

    let mut words = text.split_whitespace();
    match (words.next(), words.next()) {
        (Some(word), None) if SINGLE_WORD.is_match(word) && !is_greeting(word) => {
            Some(capitalize(word))
        }
        _ => None,
    }
}

/// Whether the text is nothing but greeting words ("hola", "buenas tardes!").
pub fn is_greeting_only(text: &str) -> bool {
    let mut words = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .peekable();
    words.peek().is_some() && words.all(is_greeting)
}

fn is_greeting(word: &str) -> bool {
    NOT_NAMES.contains(&word.to_lowercase().as_str())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn introductions() {
        assert_eq!(extract_name("me llamo ana"), Some("Ana".to_string()));
        assert_eq!(extract_name("Hola, soy JOSÉ"), Some("José".to_string()));
        assert_eq!(extract_name("Mi nombre es Íñigo"), Some("Íñigo".to_string()));
    }

    #[test]
    fn single_word() {
        assert_eq!(extract_name("  maría "), Some("María".to_string()));
    }

    #[test]
    fn greetings_are_not_names() {
        assert_eq!(extract_name("hola"), None);
        assert_eq!(extract_name("soy hola"), None);
    }

    #[test]
    fn greeting_only_text() {
        assert!(is_greeting_only("hola"));
        assert!(is_greeting_only("¡Buenas tardes!"));
        assert!(!is_greeting_only("hola, quiero ayuda"));
        assert!(!is_greeting_only("Luis Pérez"));
        assert!(!is_greeting_only("  "));
    }

    #[test]
    fn sentences_without_intro_yield_nothing() {
        assert_eq!(extract_name("quiero información"), None);
        assert_eq!(extract_name("R2D2"), None);
    }
}
