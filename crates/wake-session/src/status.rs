//! User-facing status lines.

use chat_completion::CompletionError;

pub const WAKE_DETECTED: &str = "Wake word riconosciuta. Parla ora.";
pub const THINKING: &str = "Sto pensando...";
pub const REPLY_READY: &str = "Risposta pronta.";
pub const SYNTHESIS_UNAVAILABLE: &str = "Sintesi vocale non supportata.";
pub const SYNTHESIS_FAILED: &str = "Sintesi vocale non riuscita.";

pub fn prompt(wake_word: &str) -> String {
    let mut chars = wake_word.chars();
    let display: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("Dì '{display}' per attivare l'ascolto.")
}

pub fn hearing(partial: &str) -> String {
    format!("Ascolto... {partial}")
}

pub fn recognition_error(code: &str) -> String {
    format!("Errore riconoscimento vocale: {code}")
}

pub fn completion_error(error: &CompletionError) -> String {
    format!("Errore comunicazione modello: {error}")
}

pub fn unsupported(what: &str) -> String {
    format!("Funzione non supportata: {what}. L'assistente è fermo.")
}
