//! Localized user-facing status texts
//!
//! Progress notices and the failure fallback. Unknown languages fall back
//! to English.

use serde::{Deserialize, Serialize};

const FALLBACK_LANGUAGE: &str = "en";

/// Built-in status messages the pipeline sends on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKey {
    TranscribingVoice,
    PackagingVoiceResponse,
    ProcessingError,
}

/// A progress notice ready to send
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMessage {
    pub text: String,
}

impl ProgressMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

fn lookup(key: StatusKey, language: &str) -> Option<&'static str> {
    let text = match (key, language) {
        (StatusKey::TranscribingVoice, "en") => "I'm listening to your voice message...",
        (StatusKey::TranscribingVoice, "es") => "Estoy escuchando tu mensaje de voz...",
        (StatusKey::TranscribingVoice, "fr") => "J'écoute votre message vocal...",
        (StatusKey::TranscribingVoice, "pt") => "Estou ouvindo sua mensagem de voz...",

        (StatusKey::PackagingVoiceResponse, "en") => "Recording a voice reply for you...",
        (StatusKey::PackagingVoiceResponse, "es") => "Grabando una respuesta de voz para ti...",
        (StatusKey::PackagingVoiceResponse, "fr") => "J'enregistre une réponse vocale pour vous...",
        (StatusKey::PackagingVoiceResponse, "pt") => "Gravando uma resposta de voz para você...",

        (StatusKey::ProcessingError, "en") => {
            "Sorry, something went wrong while processing your message. Please try again."
        }
        (StatusKey::ProcessingError, "es") => {
            "Lo siento, algo salió mal al procesar tu mensaje. Por favor, inténtalo de nuevo."
        }
        (StatusKey::ProcessingError, "fr") => {
            "Désolé, une erreur s'est produite lors du traitement de votre message. Veuillez réessayer."
        }
        (StatusKey::ProcessingError, "pt") => {
            "Desculpe, algo deu errado ao processar sua mensagem. Por favor, tente novamente."
        }
        _ => return None,
    };
    Some(text)
}

/// Localized text for `key`; `None` or unknown languages use English
pub fn status_text(key: StatusKey, language: Option<&str>) -> String {
    let language = language
        .map(|l| l.trim().to_ascii_lowercase())
        .unwrap_or_default();
    lookup(key, &language)
        .or_else(|| lookup(key, FALLBACK_LANGUAGE))
        .unwrap_or_default()
        .to_string()
}

pub fn progress_message(key: StatusKey, language: Option<&str>) -> ProgressMessage {
    ProgressMessage::new(status_text(key, language))
}
